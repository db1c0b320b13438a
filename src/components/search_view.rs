use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use reminder_tui::Reminder;

use crate::theme;

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<(NaiveDate, Reminder)>,
    pub selected: usize,
}

impl SearchState {
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn current(&self) -> Option<&(NaiveDate, Reminder)> {
        self.results.get(self.selected)
    }
}

pub struct SearchView;

impl SearchView {
    pub fn render(frame: &mut Frame, area: Rect, state: &SearchState) {
        let theme = theme::current();
        let popup_w = area.width.clamp(30, 70);
        let popup_h = area.height.clamp(8, 20);
        let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
        let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

        frame.render_widget(Clear, popup_area);

        let found = match state.results.len() {
            0 if state.query.trim().is_empty() => String::new(),
            0 => " no matches ".to_string(),
            n => format!(" {n} found "),
        };
        let block = Block::default()
            .title(" Search ")
            .title_style(theme.header)
            .title_bottom(Line::from(Span::styled(found, theme.dim)))
            .borders(Borders::ALL)
            .border_style(theme.border);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let input = Line::from(vec![
            Span::styled("/ ", theme.marker),
            Span::raw(format!("{}_", state.query)),
        ]);
        frame.render_widget(Paragraph::new(input), rows[0]);

        let items: Vec<ListItem> = state
            .results
            .iter()
            .map(|(date, rem)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{date} "), theme.dim),
                    Span::styled(format!("{:>7} ", rem.time_display()), theme.dim),
                    Span::raw(rem.title.clone()),
                ]))
            })
            .collect();

        let list = List::new(items).highlight_style(theme.highlight).highlight_symbol("> ");
        let selected = (!state.results.is_empty()).then_some(state.selected);
        let mut list_state = ListState::default().with_selected(selected);
        frame.render_stateful_widget(list, rows[2], &mut list_state);
    }
}
