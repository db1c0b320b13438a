use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use reminder_tui::config::config_path;
use serde::Deserialize;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Get the active theme (loaded once on first call).
pub fn current() -> &'static Theme {
    THEME.get_or_init(|| Theme::load().unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub highlight: Style,
    pub marker: Style,
    pub alert: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            today: Style::default().fg(Color::Black).bg(Color::Yellow),
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            highlight: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            marker: Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
            alert: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        let content = std::fs::read_to_string(&path).ok()?;
        let file: ConfigFile = toml::from_str(&content).ok()?;
        Some(file.theme.into_theme())
    }

    /// Get a built-in preset by name.
    pub fn preset(name: &str) -> Self {
        match name {
            "gruvbox" => Self::gruvbox(),
            "nord" => Self::nord(),
            _ => Self::default(),
        }
    }

    fn gruvbox() -> Self {
        let fg = Color::Rgb(235, 219, 178);
        let panel = Color::Rgb(80, 73, 69);
        Self {
            today: Style::default().fg(Color::Black).bg(Color::Rgb(250, 189, 47)),
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(131, 165, 152)),
            header: Style::default().fg(fg).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(146, 131, 116)),
            border: Style::default().fg(Color::Rgb(102, 92, 84)),
            status: Style::default().fg(fg).bg(panel),
            highlight: Style::default().bg(panel).add_modifier(Modifier::BOLD),
            marker: Style::default().fg(Color::Rgb(142, 192, 124)).add_modifier(Modifier::BOLD),
            alert: Style::default().fg(Color::Rgb(251, 73, 52)).add_modifier(Modifier::BOLD),
        }
    }

    fn nord() -> Self {
        let fg = Color::Rgb(229, 233, 240);
        let panel = Color::Rgb(67, 76, 94);
        Self {
            today: Style::default().fg(Color::Black).bg(Color::Rgb(235, 203, 139)),
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(136, 192, 208)),
            header: Style::default().fg(fg).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(76, 86, 106)),
            border: Style::default().fg(panel),
            status: Style::default().fg(fg).bg(panel),
            highlight: Style::default().bg(panel).add_modifier(Modifier::BOLD),
            marker: Style::default().fg(Color::Rgb(129, 161, 193)).add_modifier(Modifier::BOLD),
            alert: Style::default().fg(Color::Rgb(208, 135, 112)).add_modifier(Modifier::BOLD),
        }
    }
}

// ── TOML config types ──

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Default)]
struct ThemeConfig {
    preset: Option<String>,
    today_bg: Option<String>,
    selected_bg: Option<String>,
    header_fg: Option<String>,
    dim_fg: Option<String>,
    status_bg: Option<String>,
    marker_fg: Option<String>,
    alert_fg: Option<String>,
}

impl ThemeConfig {
    fn into_theme(self) -> Theme {
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        let overrides: [(&Option<String>, &mut Style, bool); 7] = [
            (&self.today_bg, &mut theme.today, true),
            (&self.selected_bg, &mut theme.selected, true),
            (&self.header_fg, &mut theme.header, false),
            (&self.dim_fg, &mut theme.dim, false),
            (&self.status_bg, &mut theme.status, true),
            (&self.marker_fg, &mut theme.marker, false),
            (&self.alert_fg, &mut theme.alert, false),
        ];
        for (value, style, background) in overrides {
            if let Some(c) = value.as_deref().and_then(parse_color) {
                *style = if background { style.bg(c) } else { style.fg(c) };
            }
        }

        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#').filter(|h| h.len() == 6) {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    s.to_lowercase().replace("grey", "gray").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_named_colors() {
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("Cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("darkgrey"), Some(Color::DarkGray));
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let file: ConfigFile = toml::from_str(
            r##"
            [theme]
            preset = "nord"
            alert_fg = "#010203"
            "##,
        )
        .unwrap();
        let theme = file.theme.into_theme();
        assert_eq!(theme.alert.fg, Some(Color::Rgb(1, 2, 3)));
        assert_eq!(theme.selected.bg, Theme::nord().selected.bg);
    }
}
