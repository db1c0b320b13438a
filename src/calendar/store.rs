use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::debug;

use super::reminder::{Reminder, ReminderFields, ReminderId, ReminderRecord};
use crate::error::{Error, Result};

/// Owns every reminder, bucketed by anchor date.
///
/// Invariants: each reminder lives in exactly one bucket, keyed by its own
/// `date`; no bucket is empty; ids are unique across the store. The id index
/// mirrors the buckets so lookups by id do not scan.
#[derive(Debug, Default, Clone)]
pub struct Store {
    buckets: BTreeMap<NaiveDate, Vec<Reminder>>,
    index: HashMap<ReminderId, NaiveDate>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &ReminderId) -> bool {
        self.index.contains_key(id)
    }

    /// Validates `fields`, assigns a fresh id and files the reminder under
    /// its date. Nothing is inserted when validation fails.
    pub fn add(&mut self, fields: &ReminderFields) -> Result<ReminderId> {
        let id = self.fresh_id();
        let reminder = fields.validate(id.clone())?;
        debug!(id = %id, date = %reminder.date, "reminder added");
        self.insert(reminder);
        Ok(id)
    }

    /// Inserts a reminder that already carries an id (persistence, import).
    /// A blank id is replaced with a fresh one.
    pub fn insert_record(&mut self, record: &ReminderRecord) -> Result<ReminderId> {
        let id = match record.id.trim() {
            "" => self.fresh_id(),
            raw => ReminderId::from(raw),
        };
        if self.contains(&id) {
            return Err(Error::DuplicateId(id));
        }
        let reminder = record.fields.validate(id.clone())?;
        self.insert(reminder);
        Ok(id)
    }

    /// Replaces the reminder's fields, moving it to another bucket when the
    /// date changes. The id is kept.
    pub fn update(&mut self, id: &ReminderId, fields: &ReminderFields) -> Result<()> {
        let old_date = *self
            .index
            .get(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        let updated = fields.validate(id.clone())?;

        if updated.date == old_date {
            if let Some(slot) = self
                .buckets
                .get_mut(&old_date)
                .and_then(|bucket| bucket.iter_mut().find(|r| &r.id == id))
            {
                *slot = updated;
            }
            debug!(id = %id, "reminder updated in place");
        } else {
            let new_date = updated.date;
            self.take(id, old_date);
            self.insert(updated);
            debug!(id = %id, from = %old_date, to = %new_date, "reminder moved");
        }
        Ok(())
    }

    /// Removes the reminder, dropping its bucket if it was the last one.
    pub fn delete(&mut self, id: &ReminderId) -> Result<Reminder> {
        let date = *self
            .index
            .get(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        let removed = self
            .take(id, date)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        debug!(id = %id, date = %date, "reminder deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &ReminderId) -> Option<&Reminder> {
        let date = self.index.get(id)?;
        self.buckets.get(date)?.iter().find(|r| &r.id == id)
    }

    /// Reminders anchored on `date`, all-day entries first, then by time.
    /// Entries with equal times keep insertion order.
    pub fn get_by_date(&self, date: NaiveDate) -> Vec<&Reminder> {
        let mut out: Vec<&Reminder> = self
            .buckets
            .get(&date)
            .map(|bucket| bucket.iter().collect())
            .unwrap_or_default();
        out.sort_by_key(|r| r.time);
        out
    }

    /// Every `(date, reminder)` pair in date order. Calling it again starts
    /// over from the current contents.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &Reminder)> + '_ {
        self.buckets
            .iter()
            .flat_map(|(date, bucket)| bucket.iter().map(move |r| (*date, r)))
    }

    /// The dates that currently have a bucket, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.keys().copied()
    }

    pub(crate) fn bucket(&self, date: NaiveDate) -> Option<&[Reminder]> {
        self.buckets.get(&date).map(Vec::as_slice)
    }

    /// Bucket dates in `[start, end)`, ascending.
    pub(crate) fn dates_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.range(start..end).map(|(date, _)| *date)
    }

    fn insert(&mut self, reminder: Reminder) {
        self.index.insert(reminder.id.clone(), reminder.date);
        self.buckets.entry(reminder.date).or_default().push(reminder);
    }

    fn take(&mut self, id: &ReminderId, date: NaiveDate) -> Option<Reminder> {
        let bucket = self.buckets.get_mut(&date)?;
        let pos = bucket.iter().position(|r| &r.id == id)?;
        let removed = bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&date);
        }
        self.index.remove(id);
        Some(removed)
    }

    fn fresh_id(&self) -> ReminderId {
        loop {
            let id = ReminderId::generate();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
