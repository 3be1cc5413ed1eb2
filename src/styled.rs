//! Terminal colours for CLI output

use std::fmt::Display;
use std::io::IsTerminal;

use anstyle::{AnsiColor, Color, Effects, Style};

/// Style presets for consistent output
pub struct Styles;

impl Styles {
    pub fn error() -> Style {
        Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)))
    }

    pub fn warning() -> Style {
        Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)))
    }

    pub fn success() -> Style {
        Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)))
    }

    pub fn info() -> Style {
        Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)))
    }

    pub fn dim() -> Style {
        Style::new().effects(Effects::DIMMED)
    }

    pub fn header() -> Style {
        Style::new().effects(Effects::BOLD)
    }

    pub fn agent() -> Style {
        Style::new()
            .fg_color(Some(Color::Ansi(AnsiColor::Magenta)))
            .bold()
    }
}

/// Applies styles only when the target stream is a terminal
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn stdout() -> Self {
        Self {
            enabled: std::io::stdout().is_terminal(),
        }
    }

    pub fn stderr() -> Self {
        Self {
            enabled: std::io::stderr().is_terminal(),
        }
    }

    pub fn paint(self, style: Style, text: impl Display) -> String {
        if self.enabled {
            format!("{style}{text}{style:#}")
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_palette_leaves_text_untouched() {
        assert_eq!(Palette { enabled: false }.paint(Styles::error(), "boom"), "boom");
    }

    #[test]
    fn enabled_palette_wraps_in_escape_codes() {
        let painted = Palette { enabled: true }.paint(Styles::success(), "ok");
        assert!(painted.starts_with('\u{1b}'));
        assert!(painted.contains("ok"));
        assert!(painted.ends_with("\u{1b}[0m"));
    }
}
