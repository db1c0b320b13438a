use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use super::reminder::Reminder;
use super::store::Store;

impl Store {
    /// Case-insensitive substring search over titles and descriptions,
    /// ordered by date then time (all-day first). A blank query matches
    /// nothing.
    pub fn search(&self, query: &str) -> Vec<(NaiveDate, &Reminder)> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(NaiveDate, &Reminder)> = self
            .iter()
            .filter(|(_, r)| {
                r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
            })
            .collect();
        hits.sort_by_key(|(date, r)| (*date, r.time));
        hits
    }

    /// Whether any reminder is anchored on `date`.
    pub fn has_reminders_on(&self, date: NaiveDate) -> bool {
        self.bucket(date).is_some()
    }

    /// Days of the given month that have at least one reminder anchored on
    /// them, for calendar highlighting.
    pub fn days_with_reminders(&self, year: i32, month: u32) -> HashSet<u32> {
        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return HashSet::new();
        };
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        match end {
            Some(end) => self.dates_between(start, end).map(|d| d.day()).collect(),
            None => self
                .dates()
                .filter(|d| *d >= start)
                .map(|d| d.day())
                .collect(),
        }
    }
}
