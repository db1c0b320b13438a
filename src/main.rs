mod app;
mod components;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use reminder_tui::calendar::persist;
use reminder_tui::{logging, scheduler, Config, Notification, Scheduler};
use tokio::sync::mpsc;

use components::reminder_form::FormField;

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    let log_path = logging::init(&config.log_level, &config.log_dir)?;

    eprintln!("Loading reminders from {}...", config.data_file.display());
    let outcome = persist::load(&config.data_file)?;
    for skipped in &outcome.skipped {
        eprintln!(
            "  skipped record {:?} under {}: {}",
            skipped.id, skipped.key, skipped.reason
        );
    }
    if !outcome.skipped.is_empty() {
        let bak = persist::backup(&config.data_file)?;
        eprintln!("  original kept at {}", bak.display());
        eprintln!("  details in {}", log_path.display());
    }

    let store = scheduler::shared(outcome.store);
    let (notify, mut notifications) = mpsc::unbounded_channel::<Notification>();
    let handle = Scheduler::new(store.clone(), notify)
        .with_period(config.scan_interval())
        .spawn()?;

    let mut app = App::new(store, config.data_file.clone(), config.export_file.clone());

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &mut notifications);
    tui::restore()?;

    handle.stop();
    app.save();
    result
}

fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    notifications: &mut mpsc::UnboundedReceiver<Notification>,
) -> Result<()> {
    while app.running {
        while let Ok(note) = notifications.try_recv() {
            app.receive(note);
        }
        app.tick_clock();

        terminal.draw(|frame| draw(frame, app))?;

        if let Some(key) = tui::next_key_event(Duration::from_millis(200))? {
            if app.pending_delete.is_some() {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                    _ => app.cancel_delete(),
                }
                continue;
            }

            // Clear status message on any key
            app.status_message = None;

            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            if app.current_notification().is_some() && app.input_mode == InputMode::Normal {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    app.dismiss_notification();
                }
                continue;
            }

            if app.detail.is_some() {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => app.close_detail(),
                    KeyCode::Char('e') => app.open_edit_form(),
                    KeyCode::Char('d') => app.request_delete(),
                    _ => {}
                }
                continue;
            }

            match app.input_mode {
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Search => handle_search_input(app, key.code),
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    render_main_layout(frame, layout[0], app, area.width);

    if let Some(ref detail) = app.detail {
        components::day_view::render_detail_popup(frame, area, detail);
    }
    if let Some(ref form) = app.form_state {
        components::ReminderForm::render(frame, area, form);
    }
    if app.input_mode == InputMode::Search {
        components::SearchView::render(frame, area, &app.search);
    }
    if app.input_mode == InputMode::Normal {
        if let Some(note) = app.current_notification() {
            components::status_bar::render_notification(
                frame,
                area,
                note,
                app.notifications.len(),
            );
        }
    }
    if app.show_help {
        render_help(frame, area);
    }

    components::StatusBar::render(
        frame,
        layout[1],
        app.input_mode,
        app.status_message.as_deref(),
        app.notifications.len(),
    );
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('n'), _) => app.open_new_form(),
        (KeyCode::Char('e'), _) => app.open_edit_form(),
        (KeyCode::Char('d'), _) => app.request_delete(),
        (KeyCode::Char('/'), _) => app.open_search(),
        (KeyCode::Char('x'), _) => app.export_csv(),
        (KeyCode::Char('i'), _) => app.import_csv(),
        (KeyCode::Enter, _) => app.show_detail(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_up(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_down(),
        (KeyCode::Char('H'), _) => app.prev_week(),
        (KeyCode::Char('L'), _) => app.next_week(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => {
            if let Some(form) = app.form_mut() {
                form.active_field = form.active_field.next();
            }
        }
        KeyCode::BackTab => {
            if let Some(form) = app.form_mut() {
                form.active_field = form.active_field.prev();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.form_mut() {
                form.backspace();
            }
        }
        KeyCode::Left | KeyCode::Right => {
            if let Some(form) = app.form_mut().filter(|f| f.active_field == FormField::Recurrence) {
                form.cycle_recurrence();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.form_mut() {
                form.input_char(c);
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.open_search_result(),
        KeyCode::Up => app.search.select_prev(),
        KeyCode::Down => app.search.select_next(),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) => app.search_input(c),
        _ => {}
    }
}

fn render_main_layout(frame: &mut ratatui::Frame, area: Rect, app: &App, total_width: u16) {
    if total_width < 60 {
        let rows = Layout::vertical([Constraint::Length(9), Constraint::Min(3)]).split(area);
        components::MonthView::render(
            frame,
            rows[0],
            app.selected_date,
            app.today,
            &app.days_with_reminders,
        );
        components::DayView::render(
            frame,
            rows[1],
            app.selected_date,
            &app.day_reminders,
            app.selected,
        );
    } else {
        let month_w = if total_width >= 100 { 40 } else { 38 };
        let content = Layout::horizontal([Constraint::Length(month_w), Constraint::Min(20)])
            .split(area);

        components::MonthView::render(
            frame,
            content[0],
            app.selected_date,
            app.today,
            &app.days_with_reminders,
        );
        components::DayView::render(
            frame,
            content[1],
            app.selected_date,
            &app.day_reminders,
            app.selected,
        );
    }
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let dim = theme::current().dim;
    let popup_w = area.width.clamp(30, 52);
    let popup_h = area.height.clamp(12, 24);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![Span::styled(format!("  {keys:<10}"), key_style), Span::raw(desc)])
    };

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        entry("h/l", "Previous/next day"),
        entry("H/L", "Previous/next week"),
        entry("[/]", "Previous/next month"),
        entry("j/k", "Select reminder"),
        entry("t", "Jump to today"),
        Line::from(""),
        Line::from(Span::styled("Reminders", section_style)),
        entry("Enter", "Show details"),
        entry("n", "New reminder"),
        entry("e", "Edit selected"),
        entry("d", "Delete selected"),
        entry("/", "Search titles and notes"),
        entry("x", "Export to CSV"),
        entry("i", "Import from CSV"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", dim),
            Span::styled("Esc     ", key_style),
            Span::raw("Quit / close popup"),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
