//! Date-anchored reminders with daily, weekly and monthly recurrence, and a
//! periodic scan that reports which reminders are due.

pub mod calendar;
pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;

pub use calendar::{Recurrence, Reminder, ReminderFields, ReminderId, Store};
pub use config::Config;
pub use error::{Error, Result};
pub use scheduler::{Notification, Scheduler, SchedulerHandle, SharedStore};
