use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme;

const DAY_NAMES: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        days_with_reminders: &HashSet<u32>,
    ) {
        let theme = theme::current();

        let block = Block::default()
            .title(format!(" {} ", selected_date.format("%B %Y")))
            .title_style(theme.header)
            .borders(Borders::ALL)
            .border_style(theme.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Line::from(
            DAY_NAMES
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let style = if i >= 5 { theme.dim } else { theme.header };
                    Span::styled(format!(" {d:^3} "), style)
                })
                .collect::<Vec<_>>(),
        );

        let Some(first_day) = selected_date.with_day(1) else {
            return;
        };
        let offset = first_day.weekday().num_days_from_monday() as usize;
        let days = days_in_month(first_day);

        let mut weeks: Vec<Line> = Vec::new();
        let mut cells: Vec<Span> = vec![Span::raw("     "); offset];
        for day in 1..=days {
            let date = first_day.with_day(day).unwrap_or(first_day);
            let has_reminder = days_with_reminders.contains(&day);

            let mut style = if date == selected_date {
                theme.selected
            } else if date == today {
                theme.today
            } else if has_reminder {
                theme.marker
            } else {
                Style::default()
            };
            if date == today {
                style = style.add_modifier(Modifier::BOLD);
            }

            let mark = if has_reminder { '*' } else { ' ' };
            cells.push(Span::styled(format!(" {day:>2}{mark} "), style));

            if cells.len() == 7 {
                weeks.push(Line::from(std::mem::take(&mut cells)));
            }
        }
        if !cells.is_empty() {
            weeks.push(Line::from(cells));
        }

        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(weeks.iter().map(|_| Constraint::Length(1)));
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        for (i, week) in weeks.into_iter().enumerate() {
            frame.render_widget(Paragraph::new(week), rows[i + 1]);
        }
    }
}

fn days_in_month(first_day: NaiveDate) -> u32 {
    first_day
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        assert_eq!(days_in_month(d(2024, 2)), 29);
        assert_eq!(days_in_month(d(2023, 2)), 28);
        assert_eq!(days_in_month(d(2024, 4)), 30);
        assert_eq!(days_in_month(d(2024, 12)), 31);
    }
}
