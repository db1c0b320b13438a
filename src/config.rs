use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const APP_DIR: &str = "reminder-tui";

/// Settings from `config.toml`. Unknown tables (such as `[theme]`, which the
/// terminal front-end reads on its own) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan_interval_secs: u64,
    pub data_file: PathBuf,
    pub export_file: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            scan_interval_secs: 60,
            data_file: data_dir.join("reminders.json"),
            export_file: data_dir.join("reminders.csv"),
            log_dir: data_dir,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the user's config file, falling back to defaults when it does
    /// not exist.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Scan period, never shorter than one second.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scan_interval(), Duration::from_secs(60));
        assert!(config.data_file.ends_with("reminder-tui/reminders.json"));
    }

    #[test]
    fn overrides_and_theme_table_is_ignored() {
        let config = Config::parse(
            r#"
            scan_interval_secs = 0
            data_file = "/tmp/r.json"
            log_level = "debug"

            [theme]
            preset = "nord"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan_interval(), Duration::from_secs(1));
        assert_eq!(config.data_file, PathBuf::from("/tmp/r.json"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "scan_interval_secs = \"soon\"").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
