use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use reminder_tui::{Recurrence, Reminder};

use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        reminders: &[Reminder],
        selected: usize,
    ) {
        let theme = theme::current();
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let count = match reminders.len() {
            0 => String::new(),
            1 => " 1 reminder ".to_string(),
            n => format!(" {n} reminders "),
        };

        let block = Block::default()
            .title(title)
            .title_style(theme.header)
            .title_bottom(Line::from(Span::styled(count, theme.dim)))
            .borders(Borders::ALL)
            .border_style(theme.border);

        if reminders.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No reminders. Press n to add one.").style(theme.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let items: Vec<ListItem> = reminders.iter().map(format_reminder).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(theme.highlight)
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(selected.min(reminders.len() - 1)));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn recurrence_badge(rule: Recurrence) -> &'static str {
    match rule {
        Recurrence::None => "",
        Recurrence::Daily => " [daily]",
        Recurrence::Weekly => " [weekly]",
        Recurrence::Monthly => " [monthly]",
    }
}

fn format_reminder(rem: &Reminder) -> ListItem<'static> {
    let theme = theme::current();
    let time_span = Span::styled(
        format!("{:>7} ", rem.time_display()),
        Style::default().add_modifier(Modifier::DIM),
    );
    let mut spans = vec![
        time_span,
        Span::styled(rem.title.clone(), Style::default()),
        Span::styled(recurrence_badge(rem.recurrence), theme.marker),
    ];
    if !rem.tags.is_empty() {
        spans.push(Span::styled(format!(" #{}", rem.tags.join(" #")), theme.dim));
    }
    ListItem::new(Line::from(spans))
}

/// Render a reminder detail popup overlay.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, rem: &Reminder) {
    let theme = theme::current();
    let popup_w = area.width.clamp(30, 60);
    let popup_h = area.height.clamp(8, 16);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", rem.title))
        .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let label = |text: &'static str| Span::styled(text, theme.dim);
    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            label("Date: "),
            Span::raw(rem.date.format("%A, %B %d, %Y").to_string()),
        ]),
        Line::from(vec![label("Time: "), Span::raw(rem.time_display())]),
        Line::from(vec![label("Repeats: "), Span::raw(rem.recurrence.to_string())]),
    ];

    if let Some(end) = rem.end_date {
        lines.push(Line::from(vec![
            label("Until: "),
            Span::raw(end.format("%Y-%m-%d").to_string()),
        ]));
    }
    if !rem.tags.is_empty() {
        lines.push(Line::from(vec![label("Tags: "), Span::raw(rem.tags.join(", "))]));
    }
    if !rem.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(label("Notes:")));
        lines.extend(rem.description.lines().map(|l| Line::from(l.to_string())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(label("e:Edit  d:Delete  Esc:Close")));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
