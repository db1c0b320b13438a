use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::calendar::ReminderId;

/// A reminder field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Date,
    Time,
    Recurrence,
    EndDate,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
            Self::Time => "time",
            Self::Recurrence => "recurrence",
            Self::EndDate => "end_date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every offending field of a rejected submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn contains(&self, field: Field) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid reminder: ")?;
        for (i, err) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("reminder {0} not found")]
    NotFound(ReminderId),

    #[error("reminder id {0} is already in use")]
    DuplicateId(ReminderId),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reminder file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a single record was passed over during a bulk load, import or scan.
///
/// Skips are reported and processing continues with the next record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The row has fewer columns than the header requires.
    ShortRow { expected: usize, found: usize },
    /// The row could not be decoded at all.
    Malformed(String),
    Invalid(ValidationError),
    DuplicateId(ReminderId),
    /// Date arithmetic left the representable calendar range.
    DateOverflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortRow { expected, found } => {
                write!(f, "expected at least {expected} columns, found {found}")
            }
            Self::Malformed(msg) => write!(f, "malformed row: {msg}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate reminder id {id}"),
            Self::DateOverflow => f.write_str("occurrence date out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let err = ValidationError {
            fields: vec![
                FieldError::new(Field::Title, "must not be empty"),
                FieldError::new(Field::Time, "expected HH:MM"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("title: must not be empty"));
        assert!(msg.contains("time: expected HH:MM"));
        assert!(err.contains(Field::Time));
        assert!(!err.contains(Field::Date));
    }
}
