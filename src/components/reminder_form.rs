use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use reminder_tui::calendar::reminder::DATE_FORMAT;
use reminder_tui::{Recurrence, Reminder, ReminderFields, ReminderId};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Date,
    Time,
    Description,
    Recurrence,
    EndDate,
    Tags,
}

impl FormField {
    const ORDER: [FormField; 7] = [
        FormField::Title,
        FormField::Date,
        FormField::Time,
        FormField::Description,
        FormField::Recurrence,
        FormField::EndDate,
        FormField::Tags,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone)]
pub struct ReminderFormState {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub recurrence: Recurrence,
    pub end_date: String,
    pub tags: String,
    pub active_field: FormField,
    /// Set when editing; captured when the form opens.
    pub editing: Option<ReminderId>,
}

impl ReminderFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            date: date.format(DATE_FORMAT).to_string(),
            time: "09:00".to_string(),
            description: String::new(),
            recurrence: Recurrence::None,
            end_date: String::new(),
            tags: String::new(),
            active_field: FormField::Title,
            editing: None,
        }
    }

    pub fn edit(reminder: &Reminder) -> Self {
        let fields = reminder.to_fields();
        Self {
            title: fields.title,
            date: fields.date,
            time: fields.time.unwrap_or_default(),
            description: fields.description,
            recurrence: reminder.recurrence,
            end_date: fields.end_date.unwrap_or_default(),
            tags: fields.tags.join(", "),
            active_field: FormField::Title,
            editing: Some(reminder.id.clone()),
        }
    }

    pub fn to_fields(&self) -> ReminderFields {
        ReminderFields {
            date: self.date.clone(),
            time: Some(self.time.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            recurrence: self.recurrence.as_str().to_string(),
            end_date: Some(self.end_date.clone()),
            tags: self.tags.split(',').map(str::to_string).collect(),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.active_field {
            FormField::Title => Some(&mut self.title),
            FormField::Date => Some(&mut self.date),
            FormField::Time => Some(&mut self.time),
            FormField::Description => Some(&mut self.description),
            FormField::EndDate => Some(&mut self.end_date),
            FormField::Tags => Some(&mut self.tags),
            FormField::Recurrence => None,
        }
    }

    /// Steps the recurrence rule, wherever the cursor is.
    pub fn cycle_recurrence(&mut self) {
        self.recurrence = self.recurrence.cycle();
    }

    pub fn input_char(&mut self, c: char) {
        if self.active_field == FormField::Recurrence {
            if c == ' ' {
                self.cycle_recurrence();
            }
            return;
        }
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }
}

pub struct ReminderForm;

impl ReminderForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &ReminderFormState) {
        // Center the form popup
        let form_w = area.width.clamp(30, 56);
        let form_h = area.height.clamp(10, 13);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h).intersection(area);

        frame.render_widget(Clear, form_area);

        let title = if state.editing.is_some() {
            " Edit Reminder "
        } else {
            " New Reminder "
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // date
            Constraint::Length(1), // time
            Constraint::Length(1), // description
            Constraint::Length(1), // recurrence
            Constraint::Length(1), // end date
            Constraint::Length(1), // tags
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        let active = state.active_field;
        render_field(frame, rows[0], "Title:", &state.title, active == FormField::Title);
        render_field(frame, rows[1], "Date:", &state.date, active == FormField::Date);
        render_field(frame, rows[2], "Time:", &state.time, active == FormField::Time);
        render_field(frame, rows[3], "Notes:", &state.description, active == FormField::Description);
        render_field(
            frame,
            rows[4],
            "Repeat:",
            &format!("< {} >", state.recurrence),
            active == FormField::Recurrence,
        );
        render_field(frame, rows[5], "Until:", &state.end_date, active == FormField::EndDate);
        render_field(frame, rows[6], "Tags:", &state.tags, active == FormField::Tags);

        let dim = theme::current().dim;
        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", dim),
            Span::styled("Space", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Repeat ", dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[8]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };
    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{label:<8}"), theme::current().dim),
        Span::styled(format!("{value}{cursor}"), style),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_cycle_wraps() {
        assert_eq!(FormField::Tags.next(), FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::Tags);
    }

    #[test]
    fn space_cycles_recurrence_only_on_that_field() {
        let mut form = ReminderFormState::new(NaiveDate::from_ymd_opt(2024, 7, 10).unwrap());
        form.input_char(' ');
        assert_eq!(form.title, " ");
        form.active_field = FormField::Recurrence;
        form.input_char(' ');
        assert_eq!(form.recurrence, Recurrence::Daily);
    }

    #[test]
    fn cycle_recurrence_wraps_and_leaves_text_alone() {
        let mut form = ReminderFormState::new(NaiveDate::from_ymd_opt(2024, 7, 10).unwrap());
        for _ in 0..Recurrence::ALL.len() {
            form.cycle_recurrence();
        }
        assert_eq!(form.recurrence, Recurrence::None);
        form.cycle_recurrence();
        assert_eq!(form.recurrence, Recurrence::Daily);
        assert!(form.title.is_empty());
    }

    #[test]
    fn edit_round_trips_through_fields() {
        let reminder = ReminderFields::new("2024-07-10", "Gym")
            .time("06:30")
            .recurrence(Recurrence::Weekly)
            .tags(["health", "am"])
            .validate(ReminderId::from("g"))
            .unwrap();
        let form = ReminderFormState::edit(&reminder);
        assert_eq!(form.editing, Some(ReminderId::from("g")));
        assert_eq!(form.tags, "health, am");

        let again = form.to_fields().validate(ReminderId::from("g")).unwrap();
        assert_eq!(again, reminder);
    }
}
