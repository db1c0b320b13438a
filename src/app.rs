use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::{MutexGuard, PoisonError};

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use reminder_tui::calendar::{persist, tabular};
use reminder_tui::{Error, Notification, Reminder, ReminderId, SharedStore, Store};
use tracing::{error, info};

use crate::components::{ReminderFormState, SearchState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    Search,
}

pub struct App {
    pub running: bool,
    pub input_mode: InputMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub day_reminders: Vec<Reminder>,
    pub days_with_reminders: HashSet<u32>,
    pub selected: usize,
    pub form_state: Option<ReminderFormState>,
    pub search: SearchState,
    pub detail: Option<Reminder>,
    pub pending_delete: Option<ReminderId>,
    pub notifications: VecDeque<Notification>,
    pub status_message: Option<String>,
    pub show_help: bool,
    store: SharedStore,
    data_file: PathBuf,
    export_file: PathBuf,
}

impl App {
    pub fn new(store: SharedStore, data_file: PathBuf, export_file: PathBuf) -> Self {
        Self::starting_on(store, data_file, export_file, Local::now().date_naive())
    }

    fn starting_on(
        store: SharedStore,
        data_file: PathBuf,
        export_file: PathBuf,
        today: NaiveDate,
    ) -> Self {
        let mut app = Self {
            running: true,
            input_mode: InputMode::Normal,
            selected_date: today,
            today,
            day_reminders: Vec::new(),
            days_with_reminders: HashSet::new(),
            selected: 0,
            form_state: None,
            search: SearchState::default(),
            detail: None,
            pending_delete: None,
            notifications: VecDeque::new(),
            status_message: None,
            show_help: false,
            store,
            data_file,
            export_file,
        };
        app.refresh();
        app
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn refresh(&mut self) {
        let (day, marked) = {
            let store = self.store();
            let day: Vec<Reminder> = store
                .get_by_date(self.selected_date)
                .into_iter()
                .cloned()
                .collect();
            let marked =
                store.days_with_reminders(self.selected_date.year(), self.selected_date.month());
            (day, marked)
        };
        self.day_reminders = day;
        self.days_with_reminders = marked;
        self.selected = self.selected.min(self.day_reminders.len().saturating_sub(1));
    }

    /// Writes the store to the data file. Failures are reported, not fatal.
    pub fn save(&mut self) -> bool {
        let result = persist::save(&self.store(), &self.data_file);
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save reminders");
                self.status_message = Some(format!("Save failed: {e}"));
                false
            }
        }
    }

    /// Follows the wall clock across midnight.
    pub fn tick_clock(&mut self) {
        let now = Local::now().date_naive();
        if now != self.today {
            self.today = now;
            self.refresh();
        }
    }

    // ── navigation ──

    fn select_date(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            if date != self.selected_date {
                self.selected_date = date;
                self.selected = 0;
                self.refresh();
            }
        }
    }

    pub fn next_day(&mut self) {
        self.select_date(self.selected_date.succ_opt());
    }

    pub fn prev_day(&mut self) {
        self.select_date(self.selected_date.pred_opt());
    }

    pub fn next_week(&mut self) {
        self.select_date(self.selected_date.checked_add_days(Days::new(7)));
    }

    pub fn prev_week(&mut self) {
        self.select_date(self.selected_date.checked_sub_days(Days::new(7)));
    }

    pub fn next_month(&mut self) {
        self.select_date(self.selected_date.checked_add_months(Months::new(1)));
    }

    pub fn prev_month(&mut self) {
        self.select_date(self.selected_date.checked_sub_months(Months::new(1)));
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.select_date(Some(self.today));
    }

    pub fn select_down(&mut self) {
        if self.selected + 1 < self.day_reminders.len() {
            self.selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_reminder(&self) -> Option<&Reminder> {
        self.day_reminders.get(self.selected)
    }

    pub fn show_detail(&mut self) {
        self.detail = self.selected_reminder().cloned();
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    // ── add / edit ──

    pub fn open_new_form(&mut self) {
        self.form_state = Some(ReminderFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn open_edit_form(&mut self) {
        let Some(reminder) = self.selected_reminder() else {
            self.status_message = Some("Nothing selected".to_string());
            return;
        };
        self.form_state = Some(ReminderFormState::edit(reminder));
        self.detail = None;
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn form_mut(&mut self) -> Option<&mut ReminderFormState> {
        self.form_state.as_mut()
    }

    pub fn submit_form(&mut self) {
        let Some(form) = self.form_state.as_ref() else {
            return;
        };
        let fields = form.to_fields();
        let editing = form.editing.clone();

        let result = {
            let mut store = self.store();
            let id = match editing {
                Some(id) => store.update(&id, &fields).map(|()| id),
                None => store.add(&fields),
            };
            id.map(|id| store.get(&id).map(|r| (r.date, r.title.clone())))
        };

        match result {
            Ok(saved) => {
                self.close_form();
                if let Some((date, title)) = saved {
                    info!(%date, "reminder saved");
                    self.status_message = Some(format!("Saved '{title}'"));
                    self.selected_date = date;
                }
                self.save();
                self.refresh();
            }
            Err(Error::Validation(e)) => {
                self.status_message = Some(e.to_string());
            }
            Err(e) => {
                self.close_form();
                self.status_message = Some(e.to_string());
                self.refresh();
            }
        }
    }

    // ── delete ──

    /// First step of a delete; `confirm_delete` finishes it.
    pub fn request_delete(&mut self) {
        let Some((id, title)) = self
            .detail
            .as_ref()
            .or(self.selected_reminder())
            .map(|r| (r.id.clone(), r.title.clone()))
        else {
            return;
        };
        self.status_message = Some(format!("Delete '{title}'? (y/n)"));
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.status_message = None;
    }

    pub fn confirm_delete(&mut self) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        let removed = self.store().delete(&id);
        match removed {
            Ok(reminder) => {
                info!(id = %reminder.id, "reminder deleted");
                self.status_message = Some(format!("Deleted '{}'", reminder.title));
                self.detail = None;
                self.save();
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
        self.refresh();
    }

    // ── search ──

    pub fn open_search(&mut self) {
        self.search = SearchState::default();
        self.input_mode = InputMode::Search;
    }

    pub fn close_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn search_input(&mut self, c: char) {
        self.search.query.push(c);
        self.run_search();
    }

    pub fn search_backspace(&mut self) {
        self.search.query.pop();
        self.run_search();
    }

    fn run_search(&mut self) {
        let results: Vec<(NaiveDate, Reminder)> = self
            .store()
            .search(&self.search.query)
            .into_iter()
            .map(|(date, r)| (date, r.clone()))
            .collect();
        self.search.results = results;
        self.search.selected = 0;
    }

    /// Jumps to the date of the highlighted search hit and selects it.
    pub fn open_search_result(&mut self) {
        let Some((date, id)) = self.search.current().map(|(d, r)| (*d, r.id.clone())) else {
            return;
        };
        self.close_search();
        self.select_date(Some(date));
        if let Some(pos) = self.day_reminders.iter().position(|r| r.id == id) {
            self.selected = pos;
        }
    }

    // ── CSV ──

    pub fn export_csv(&mut self) {
        let result = tabular::export_to_path(&self.store(), &self.export_file);
        self.status_message = Some(match result {
            Ok(n) => format!("Exported {n} reminders to {}", self.export_file.display()),
            Err(e) => {
                error!(error = %e, "export failed");
                format!("Export failed: {e}")
            }
        });
    }

    pub fn import_csv(&mut self) {
        let result = tabular::import_from_path(&mut self.store(), &self.export_file);
        match result {
            Ok(report) => {
                self.status_message = Some(report.summary());
                if report.imported > 0 {
                    self.save();
                }
            }
            Err(e) => {
                error!(error = %e, "import failed");
                self.status_message = Some(format!("Import failed: {e}"));
            }
        }
        self.refresh();
    }

    // ── notifications ──

    pub fn receive(&mut self, note: Notification) {
        self.notifications.push_back(note);
    }

    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications.front()
    }

    pub fn dismiss_notification(&mut self) {
        if let Some(note) = self.notifications.pop_front() {
            self.status_message = Some(note.message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::reminder_form::FormField;
    use chrono::NaiveTime;
    use reminder_tui::scheduler;
    use reminder_tui::ReminderFields;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn app_in(dir: &tempfile::TempDir, store: Store) -> App {
        App::starting_on(
            scheduler::shared(store),
            dir.path().join("reminders.json"),
            dir.path().join("reminders.csv"),
            d(2024, 7, 10),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_mut().unwrap().input_char(c);
        }
    }

    #[test]
    fn new_reminder_is_listed_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, Store::new());

        app.open_new_form();
        type_text(&mut app, "Stand-up");
        app.submit_form();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.day_reminders.len(), 1);
        assert_eq!(app.day_reminders[0].time, NaiveTime::from_hms_opt(9, 0, 0));
        assert!(app.days_with_reminders.contains(&10));

        let reloaded = persist::load(&dir.path().join("reminders.json")).unwrap();
        assert_eq!(reloaded.store.len(), 1);
    }

    #[test]
    fn invalid_form_stays_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, Store::new());

        app.open_new_form();
        app.submit_form();

        assert_eq!(app.input_mode, InputMode::Form);
        assert!(app.form_state.is_some());
        assert!(app.status_message.as_deref().unwrap_or_default().contains("title"));
    }

    #[test]
    fn editing_the_date_moves_the_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new();
        store.add(&ReminderFields::new("2024-07-10", "Dentist")).unwrap();
        let mut app = app_in(&dir, store);

        app.open_edit_form();
        let form = app.form_mut().unwrap();
        form.active_field = FormField::Date;
        form.date = "2024-07-12".to_string();
        app.submit_form();

        assert_eq!(app.selected_date, d(2024, 7, 12));
        assert_eq!(app.day_reminders.len(), 1);
        assert!(!app.days_with_reminders.contains(&10));
    }

    #[test]
    fn delete_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new();
        store.add(&ReminderFields::new("2024-07-10", "Dentist")).unwrap();
        let mut app = app_in(&dir, store);

        app.request_delete();
        app.cancel_delete();
        assert_eq!(app.day_reminders.len(), 1);

        app.request_delete();
        app.confirm_delete();
        assert!(app.day_reminders.is_empty());
    }

    #[test]
    fn search_result_jumps_to_its_date() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new();
        store.add(&ReminderFields::new("2024-09-01", "Renew passport")).unwrap();
        let mut app = app_in(&dir, store);

        app.open_search();
        for c in "PASS".chars() {
            app.search_input(c);
        }
        assert_eq!(app.search.results.len(), 1);

        app.open_search_result();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.selected_date, d(2024, 9, 1));
        assert_eq!(app.selected_reminder().map(|r| r.title.as_str()), Some("Renew passport"));
    }

    #[test]
    fn month_step_clamps_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, Store::new());
        app.select_date(Some(d(2024, 1, 31)));
        app.next_month();
        assert_eq!(app.selected_date, d(2024, 2, 29));
    }

    #[test]
    fn export_then_import_skips_existing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new();
        store.add(&ReminderFields::new("2024-07-10", "Dentist")).unwrap();
        let mut app = app_in(&dir, store);

        app.export_csv();
        assert!(dir.path().join("reminders.csv").exists());

        app.import_csv();
        assert_eq!(app.day_reminders.len(), 1);
    }
}
