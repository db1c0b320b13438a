use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Field, FieldError, ValidationError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Opaque reminder identifier. Fresh ids are UUIDv4 strings; imported ids
/// are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(String);

impl ReminderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReminderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ReminderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub const ALL: [Recurrence; 4] = [Self::None, Self::Daily, Self::Weekly, Self::Monthly];

    /// Parses a recurrence keyword. Blank input means `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Cycles through the rules, used by the form's toggle.
    pub const fn cycle(self) -> Self {
        match self {
            Self::None => Self::Daily,
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::None,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated reminder. Only the store hands these out, and only by shared
/// reference, so `date` always matches the bucket the reminder lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,
    pub date: NaiveDate,
    /// `None` means all-day; all-day reminders are never due.
    pub time: Option<NaiveTime>,
    pub title: String,
    pub description: String,
    pub recurrence: Recurrence,
    pub end_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl Reminder {
    pub fn time_display(&self) -> String {
        match self.time {
            Some(t) => t.format(TIME_FORMAT).to_string(),
            None => "All day".to_string(),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    /// Whether an occurrence on `date` falls inside the end-date window.
    pub fn within_end_date(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| date <= end)
    }

    /// The editable text form of this reminder.
    pub fn to_fields(&self) -> ReminderFields {
        ReminderFields {
            date: self.date.format(DATE_FORMAT).to_string(),
            time: self.time.map(|t| t.format(TIME_FORMAT).to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            recurrence: match self.recurrence {
                Recurrence::None => String::new(),
                r => r.as_str().to_string(),
            },
            end_date: self.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            tags: self.tags.clone(),
        }
    }
}

/// Unvalidated reminder input, as typed into a form or read from disk.
///
/// Blank `time`, `end_date` and `recurrence` mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFields {
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub title: String,
    #[serde(default, rename = "desc")]
    pub description: String,
    #[serde(default)]
    pub recurrence: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ReminderFields {
    pub fn new(date: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence.as_str().to_string();
        self
    }

    pub fn end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks every field and builds the reminder, or reports all failures
    /// at once.
    ///
    /// The stored values are normalised: `title`, `description` and every
    /// tag are trimmed, blank tags are dropped and repeated tags keep only
    /// their first occurrence. Blank `time`, `end_date` and `recurrence`
    /// become absent.
    pub fn validate(&self, id: ReminderId) -> Result<Reminder, ValidationError> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new(Field::Title, "must not be empty"));
        }

        let date = match parse_date(&self.date) {
            Some(d) => Some(d),
            None => {
                errors.push(FieldError::new(
                    Field::Date,
                    format!("`{}` is not a YYYY-MM-DD date", self.date.trim()),
                ));
                None
            }
        };

        let time = match non_blank(self.time.as_deref()) {
            None => None,
            Some(raw) => match NaiveTime::parse_from_str(raw, TIME_FORMAT) {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.push(FieldError::new(
                        Field::Time,
                        format!("`{raw}` is not an HH:MM time"),
                    ));
                    None
                }
            },
        };

        let recurrence = Recurrence::parse(&self.recurrence).unwrap_or_else(|| {
            errors.push(FieldError::new(
                Field::Recurrence,
                format!(
                    "`{}` is not one of none, daily, weekly, monthly",
                    self.recurrence.trim()
                ),
            ));
            Recurrence::None
        });

        let end_date = match non_blank(self.end_date.as_deref()) {
            None => None,
            Some(raw) => match parse_date(raw) {
                Some(end) => {
                    if date.is_some_and(|start| end < start) {
                        errors.push(FieldError::new(
                            Field::EndDate,
                            "must not be earlier than the reminder date",
                        ));
                    }
                    Some(end)
                }
                None => {
                    errors.push(FieldError::new(
                        Field::EndDate,
                        format!("`{raw}` is not a YYYY-MM-DD date"),
                    ));
                    None
                }
            },
        };

        match date {
            Some(date) if errors.is_empty() => Ok(Reminder {
                id,
                date,
                time,
                title: title.to_string(),
                description: self.description.trim().to_string(),
                recurrence,
                end_date,
                tags: normalize_tags(&self.tags),
            }),
            _ => Err(ValidationError { fields: errors }),
        }
    }
}

/// The persisted shape of a reminder: its id plus the text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: ReminderFields,
}

impl From<&Reminder> for ReminderRecord {
    fn from(reminder: &Reminder) -> Self {
        let mut fields = reminder.to_fields();
        fields.recurrence = reminder.recurrence.as_str().to_string();
        Self {
            id: reminder.id.to_string(),
            fields,
        }
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Trims, drops blanks and removes repeats while keeping first-seen order.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> ReminderId {
        ReminderId::from("r-1")
    }

    #[test]
    fn stored_text_is_trimmed() {
        let reminder = ReminderFields::new(" 2024-07-10 ", "  Pay rent\t")
            .description("\n via transfer  ")
            .tags([" home ", "", "home", "bills"])
            .validate(id())
            .unwrap();
        assert_eq!(reminder.title, "Pay rent");
        assert_eq!(reminder.description, "via transfer");
        assert_eq!(reminder.tags, ["home", "bills"]);
    }

    #[test]
    fn valid_fields_build_a_reminder() {
        let fields = ReminderFields::new("2024-07-10", "  Standup ")
            .time("09:30")
            .description("daily sync")
            .recurrence(Recurrence::Weekly)
            .end_date("2024-12-31")
            .tags(["work", " team ", "work", ""]);

        let reminder = fields.validate(id()).unwrap();
        assert_eq!(reminder.title, "Standup");
        assert_eq!(reminder.date, NaiveDate::from_ymd_opt(2024, 7, 10).unwrap());
        assert_eq!(reminder.time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(reminder.recurrence, Recurrence::Weekly);
        assert_eq!(reminder.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(reminder.tags, vec!["work", "team"]);
    }

    #[test]
    fn blank_optionals_are_absent() {
        let fields = ReminderFields {
            time: Some("  ".into()),
            end_date: Some(String::new()),
            ..ReminderFields::new("2024-07-10", "Lunch")
        };
        let reminder = fields.validate(id()).unwrap();
        assert_eq!(reminder.time, None);
        assert_eq!(reminder.end_date, None);
        assert_eq!(reminder.recurrence, Recurrence::None);
        assert_eq!(reminder.time_display(), "All day");
    }

    #[test]
    fn every_bad_field_is_reported() {
        let fields = ReminderFields {
            date: "2024-13-01".into(),
            time: Some("25:00".into()),
            title: "   ".into(),
            recurrence: "yearly".into(),
            end_date: Some("tomorrow".into()),
            ..ReminderFields::default()
        };
        let err = fields.validate(id()).unwrap_err();
        for field in [
            Field::Title,
            Field::Date,
            Field::Time,
            Field::Recurrence,
            Field::EndDate,
        ] {
            assert!(err.contains(field), "missing {field}");
        }
    }

    #[test]
    fn end_date_before_date_is_rejected() {
        let fields = ReminderFields::new("2024-07-10", "Trip").end_date("2024-07-09");
        let err = fields.validate(id()).unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert!(err.contains(Field::EndDate));
    }

    #[test]
    fn recurrence_keywords() {
        assert_eq!(Recurrence::parse(""), Some(Recurrence::None));
        assert_eq!(Recurrence::parse(" Monthly "), Some(Recurrence::Monthly));
        assert_eq!(Recurrence::parse("fortnightly"), None);
        assert_eq!(Recurrence::Monthly.cycle(), Recurrence::None);
    }

    #[test]
    fn record_keeps_stable_field_names() {
        let reminder = ReminderFields::new("2024-07-10", "Dentist")
            .time("14:00")
            .description("bring card")
            .validate(id())
            .unwrap();
        let json = serde_json::to_value(ReminderRecord::from(&reminder)).unwrap();
        for key in [
            "id",
            "date",
            "time",
            "title",
            "desc",
            "recurrence",
            "end_date",
            "tags",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["recurrence"], "none");
        assert_eq!(json["time"], "14:00");
    }
}
