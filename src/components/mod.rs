pub mod day_view;
pub mod month_view;
pub mod reminder_form;
pub mod search_view;
pub mod status_bar;

pub use day_view::DayView;
pub use month_view::MonthView;
pub use reminder_form::{ReminderForm, ReminderFormState};
pub use search_view::{SearchState, SearchView};
pub use status_bar::StatusBar;
