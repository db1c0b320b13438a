//! Next-occurrence arithmetic for recurring reminders.
//!
//! All functions are pure and never report an occurrence earlier than the
//! anchor date.

use chrono::{Datelike, Days, NaiveDate};

use super::reminder::Recurrence;

/// Upper bound on months scanned for a matching day-of-month. A day that
/// exists at all (1..=31) recurs within a few months, so this is never hit
/// short of the end of chrono's calendar range.
const MONTH_SEARCH_LIMIT: usize = 24;

/// Earliest occurrence of `rule`, anchored at `anchor`, on or after
/// `reference`.
///
/// Returns `None` for [`Recurrence::None`] (there is nothing to recur) and
/// when the result would fall outside the representable date range.
///
/// Once the anchor has been reached, `Daily` yields the day after
/// `reference` and `Weekly` yields the matching weekday strictly after
/// `reference`, so neither reports `reference` itself.
pub fn next_occurrence(
    anchor: NaiveDate,
    rule: Recurrence,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    match rule {
        Recurrence::None => None,
        Recurrence::Daily => next_daily(anchor, reference),
        Recurrence::Weekly => next_weekly(anchor, reference),
        Recurrence::Monthly => next_monthly(anchor, reference),
    }
}

fn next_daily(anchor: NaiveDate, reference: NaiveDate) -> Option<NaiveDate> {
    if anchor > reference {
        Some(anchor)
    } else {
        reference.succ_opt()
    }
}

fn next_weekly(anchor: NaiveDate, reference: NaiveDate) -> Option<NaiveDate> {
    if anchor > reference {
        return Some(anchor);
    }
    let target = anchor.weekday().num_days_from_monday();
    let current = reference.weekday().num_days_from_monday();
    let ahead = match (target + 7 - current) % 7 {
        0 => 7,
        n => n,
    };
    reference.checked_add_days(Days::new(u64::from(ahead)))
}

/// Months lacking the anchor's day (the 31st in April, the 30th in
/// February, ...) are skipped rather than clamped to their last day.
fn next_monthly(anchor: NaiveDate, reference: NaiveDate) -> Option<NaiveDate> {
    let start = anchor.max(reference);
    let day = anchor.day();
    let (mut year, mut month) = (start.year(), start.month());

    for _ in 0..MONTH_SEARCH_LIMIT {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) {
            if candidate >= start {
                return Some(candidate);
            }
        }
        (year, month) = if month == 12 {
            (year.checked_add(1)?, 1)
        } else {
            (year, month + 1)
        };
    }
    None
}
