pub mod persist;
pub mod query;
pub mod recurrence;
pub mod reminder;
pub mod store;
pub mod tabular;

pub use recurrence::next_occurrence;
pub use reminder::{Recurrence, Reminder, ReminderFields, ReminderId, ReminderRecord};
pub use store::Store;
