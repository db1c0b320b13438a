use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use reminder_tui::Notification;

use crate::app::InputMode;
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        mode: InputMode,
        status: Option<&str>,
        pending: usize,
    ) {
        let theme = theme::current();
        let w = area.width as usize;

        let mode_str = match mode {
            InputMode::Normal => "Reminders",
            InputMode::Form => "Edit",
            InputMode::Search => "Search",
        };
        let badge = match pending {
            0 => String::new(),
            n => format!(" [{n} due]"),
        };

        let right = if let Some(msg) = status {
            format!(" {msg} ")
        } else {
            let hints = match mode {
                InputMode::Normal if w >= 90 => {
                    " hl:Day jk:Select [/]:Mon t:Today n:New e:Edit d:Del /:Find x/i:CSV ?:Help q:Quit"
                }
                InputMode::Normal if w >= 50 => " n:New e:Edit d:Del /:Find ?:Help q:Quit",
                InputMode::Normal => " ?:Help q:Quit",
                InputMode::Form => " Tab:Next Enter:Save Esc:Cancel",
                InputMode::Search => " Up/Down:Select Enter:Go Esc:Close",
            };
            hints.to_string()
        };

        let left = format!(" {mode_str}{badge} ");
        let padding = " ".repeat(w.saturating_sub(left.len() + right.len()));

        let mut spans = vec![Span::styled(format!(" {mode_str}"), theme.status)];
        if !badge.is_empty() {
            spans.push(Span::styled(badge, theme.status.patch(theme.alert)));
        }
        spans.push(Span::styled(" ", theme.status));
        spans.push(Span::styled(padding, theme.status));
        spans.push(Span::styled(right, theme.status));

        frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.status), area);
    }
}

/// Popup for the oldest undismissed notification.
pub fn render_notification(frame: &mut Frame, area: Rect, note: &Notification, remaining: usize) {
    let theme = theme::current();
    let popup_w = area.width.clamp(30, 54);
    let popup_h = area.height.clamp(6, 8);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 3;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Reminder ")
        .title_style(theme.alert)
        .borders(Borders::ALL)
        .border_style(theme.alert);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(note.title.clone(), theme.header)),
        Line::from(note.message()),
        Line::from(""),
    ];
    let more = if remaining > 1 {
        format!("Enter:Dismiss ({} more)", remaining - 1)
    } else {
        "Enter:Dismiss".to_string()
    };
    lines.push(Line::from(Span::styled(more, theme.dim)));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
