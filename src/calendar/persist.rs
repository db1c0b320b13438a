//! JSON snapshot of the store: `{"YYYY-MM-DD": [record, ...], ...}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use super::reminder::{parse_date, ReminderRecord};
use super::store::Store;
use crate::error::{Error, Result, SkipReason};

type Snapshot = BTreeMap<String, Vec<ReminderRecord>>;

/// What is on disk before any record is decoded. Only the outer object has
/// to be well formed.
type RawSnapshot = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Bucket key the record was found under.
    pub key: String,
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub store: Store,
    pub skipped: Vec<SkippedRecord>,
}

/// Reads a snapshot. A missing file is an empty store; individual bad
/// records are skipped and reported rather than failing the load.
pub fn load(path: &Path) -> Result<LoadOutcome> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no reminder file yet, starting empty");
            return Ok(LoadOutcome::default());
        }
        Err(e) => return Err(Error::io(path, e)),
    };
    if content.trim().is_empty() {
        return Ok(LoadOutcome::default());
    }
    let snapshot: RawSnapshot = serde_json::from_str(&content)?;
    let outcome = restore(snapshot);
    info!(
        path = %path.display(),
        loaded = outcome.store.len(),
        skipped = outcome.skipped.len(),
        "reminders loaded"
    );
    Ok(outcome)
}

fn restore(snapshot: RawSnapshot) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    for (key, bucket) in snapshot {
        let values = match bucket {
            Value::Array(values) => values,
            other => {
                let reason = SkipReason::Malformed(format!("expected a list, found {other}"));
                outcome.skip(&key, String::new(), reason);
                continue;
            }
        };
        for value in values {
            let raw_id = match value.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let record: ReminderRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(e) => {
                    outcome.skip(&key, raw_id, SkipReason::Malformed(e.to_string()));
                    continue;
                }
            };
            if parse_date(&key) != parse_date(&record.fields.date) {
                // The record's own date is authoritative; it is re-filed.
                warn!(key = %key, id = %record.id, date = %record.fields.date, "record filed under the wrong date");
            }
            if let Err(e) = outcome.store.insert_record(&record) {
                let reason = match e {
                    Error::Validation(v) => SkipReason::Invalid(v),
                    Error::DuplicateId(id) => SkipReason::DuplicateId(id),
                    other => SkipReason::Malformed(other.to_string()),
                };
                outcome.skip(&key, record.id, reason);
            }
        }
    }
    outcome
}

impl LoadOutcome {
    fn skip(&mut self, key: &str, id: String, reason: SkipReason) {
        warn!(key = %key, id = %id, %reason, "skipping stored reminder");
        self.skipped.push(SkippedRecord {
            key: key.to_string(),
            id,
            reason,
        });
    }
}

/// Copies the file at `path` to a `.json.bak` sibling so records that could
/// not be loaded survive the next save. Returns the backup path.
pub fn backup(path: &Path) -> Result<PathBuf> {
    let bak = path.with_extension("json.bak");
    fs::copy(path, &bak).map_err(|e| Error::io(&bak, e))?;
    info!(from = %path.display(), to = %bak.display(), "reminder file backed up");
    Ok(bak)
}

/// Writes the snapshot atomically: a sibling temp file is written first and
/// renamed over `path`.
pub fn save(store: &Store, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut snapshot = Snapshot::new();
    for (date, reminder) in store.iter() {
        snapshot
            .entry(date.format("%Y-%m-%d").to_string())
            .or_default()
            .push(ReminderRecord::from(reminder));
    }
    let json = serde_json::to_string_pretty(&snapshot)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}
