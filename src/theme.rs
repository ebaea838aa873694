use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

/// The two presentations the user can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn config(self) -> ThemeConfig {
        match self {
            Theme::Light => light_theme(),
            Theme::Dark => dark_theme(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label of the toggle control, naming the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark Mode",
            Theme::Dark => "Light Mode",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {s}. Expected light or dark")),
        }
    }
}

/// Complete theme configuration for ratatui
#[derive(Clone)]
pub struct ThemeConfig {
    pub border: Style,
    pub border_selected: Style,
    pub title: Style,
    pub text: Style,
    /// Table header row.
    pub header: Style,
    /// Header cell under the keyboard column cursor.
    pub header_cursor: Style,
    pub row_even: Style,
    pub row_odd: Style,
    /// Query matches inside cells.
    pub highlight: Style,
    /// Disabled controls and secondary text.
    pub muted: Style,
    pub error: Style,
}

/// Returns a ThemeConfig with dark text on a light background.
pub fn light_theme() -> ThemeConfig {
    let bg = Color::Rgb(248, 249, 250);
    let stripe = Color::Rgb(233, 236, 239);
    let fg = Color::Rgb(33, 37, 41);
    let gray = Color::Rgb(108, 117, 125);
    let dark = Color::Rgb(33, 37, 41);
    let blue = Color::Rgb(13, 110, 253);
    let mark = Color::Rgb(252, 248, 227);
    let red = Color::Rgb(220, 53, 69);

    ThemeConfig {
        border: Style::default().fg(gray),
        border_selected: Style::default().fg(blue),
        title: Style::default().fg(blue).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg).bg(bg),
        header: Style::default()
            .fg(bg)
            .bg(dark)
            .add_modifier(Modifier::BOLD),
        header_cursor: Style::default()
            .fg(bg)
            .bg(blue)
            .add_modifier(Modifier::BOLD),
        row_even: Style::default().fg(fg).bg(bg),
        row_odd: Style::default().fg(fg).bg(stripe),
        highlight: Style::default()
            .fg(Color::Black)
            .bg(mark)
            .add_modifier(Modifier::BOLD),
        muted: Style::default().fg(gray).bg(bg),
        error: Style::default().fg(red).bg(bg).add_modifier(Modifier::BOLD),
    }
}

/// Returns a ThemeConfig with light text on a dark background.
pub fn dark_theme() -> ThemeConfig {
    let bg = Color::Rgb(33, 37, 41);
    let stripe = Color::Rgb(44, 48, 52);
    let fg = Color::Rgb(248, 249, 250);
    let gray = Color::Rgb(173, 181, 189);
    let header_bg = Color::Rgb(52, 58, 64);
    let cyan = Color::Rgb(13, 202, 240);
    let yellow = Color::Rgb(255, 193, 7);
    let red = Color::Rgb(234, 134, 143);

    ThemeConfig {
        border: Style::default().fg(gray),
        border_selected: Style::default().fg(cyan),
        title: Style::default().fg(cyan).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg).bg(bg),
        header: Style::default()
            .fg(fg)
            .bg(header_bg)
            .add_modifier(Modifier::BOLD),
        header_cursor: Style::default()
            .fg(bg)
            .bg(cyan)
            .add_modifier(Modifier::BOLD),
        row_even: Style::default().fg(fg).bg(bg),
        row_odd: Style::default().fg(fg).bg(stripe),
        highlight: Style::default()
            .fg(Color::Black)
            .bg(yellow)
            .add_modifier(Modifier::BOLD),
        muted: Style::default().fg(gray).bg(bg),
        error: Style::default().fg(red).bg(bg).add_modifier(Modifier::BOLD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("LIGHT".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_toggle_swaps_presentation() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_ne!(Theme::Light.config().text, Theme::Dark.config().text);
    }
}
