//! File-backed tracing setup. The terminal belongs to the UI, so log lines
//! go to `<log_dir>/reminder-tui.log`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

pub const LOG_ENV: &str = "REMINDER_TUI_LOG";
const LOG_FILE: &str = "reminder-tui.log";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Installs the global subscriber once. Later calls return the path chosen
/// by the first one. `REMINDER_TUI_LOG` overrides `level`.
pub fn init(level: &str, log_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    fs::create_dir_all(log_dir).map_err(|e| Error::io(log_dir, e))?;
    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| Error::io(&path, e))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %path.display(), "logging started");
    }

    Ok(LOG_PATH.get_or_init(|| path).clone())
}
