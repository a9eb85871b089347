//! Centralized theming for the sift TUI
//!
//! Single source of truth for the colors and styles used by every widget.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

/// Catppuccin Mocha color palette
mod catppuccin {
    use super::Color;

    // Background layers (darkest to lightest)
    pub const MANTLE: Color = Color::Rgb(24, 24, 37); // #181825 - status bar, panels
    pub const SURFACE0: Color = Color::Rgb(49, 50, 68); // #313244 - borders
    pub const SURFACE1: Color = Color::Rgb(69, 71, 90); // #45475a - selection

    // Text colors
    pub const TEXT: Color = Color::Rgb(205, 214, 244); // #cdd6f4 - primary
    pub const SUBTEXT0: Color = Color::Rgb(166, 173, 200); // #a6adc8 - secondary
    pub const OVERLAY0: Color = Color::Rgb(108, 112, 134); // #6c7086 - muted

    // Accent colors
    pub const LAVENDER: Color = Color::Rgb(180, 190, 254); // #b4befe - focused borders
    pub const BLUE: Color = Color::Rgb(137, 180, 250); // #89b4fa - accent
    pub const TEAL: Color = Color::Rgb(148, 226, 213); // #94e2d5 - labels
    pub const GREEN: Color = Color::Rgb(166, 227, 161); // #a6e3a1 - success, positive
    pub const YELLOW: Color = Color::Rgb(249, 226, 175); // #f9e2af - warnings, syncing
    pub const PEACH: Color = Color::Rgb(250, 179, 135); // #fab387 - counts
    pub const RED: Color = Color::Rgb(243, 139, 168); // #f38ba8 - errors, negative
}

/// Semantic colors
pub mod colors {
    use super::{Color, catppuccin};

    pub fn bg_selection() -> Color {
        catppuccin::SURFACE1
    }

    pub fn bg_status() -> Color {
        catppuccin::MANTLE
    }

    pub fn bg_error() -> Color {
        catppuccin::RED
    }

    pub fn fg_primary() -> Color {
        catppuccin::TEXT
    }

    pub fn fg_secondary() -> Color {
        catppuccin::SUBTEXT0
    }

    pub fn fg_muted() -> Color {
        catppuccin::OVERLAY0
    }

    pub fn fg_accent() -> Color {
        catppuccin::BLUE
    }

    pub fn fg_warning() -> Color {
        catppuccin::YELLOW
    }

    pub fn fg_label() -> Color {
        catppuccin::TEAL
    }

    pub fn fg_count() -> Color {
        catppuccin::PEACH
    }

    pub fn fg_success() -> Color {
        catppuccin::GREEN
    }

    pub fn fg_error() -> Color {
        catppuccin::RED
    }

    pub fn border() -> Color {
        catppuccin::SURFACE0
    }

    pub fn border_focused() -> Color {
        catppuccin::LAVENDER
    }
}

/// UI symbols - centralized for consistency
pub mod symbols {
    pub const CONNECTED: &str = "●";
    pub const DISCONNECTED: &str = "○";
    pub const ATTENTION: &str = "!";
    pub const REPLYABLE: &str = "↩";
    pub const GROUP_EXPANDED: &str = "▼ ";
    pub const GROUP_COLLAPSED: &str = "▶ ";
}

/// Pre-composed styles for common UI elements
pub struct Theme;

impl Theme {
    pub fn selected() -> Style {
        Style::default()
            .bg(colors::bg_selection())
            .fg(colors::fg_primary())
    }

    pub fn selected_bold() -> Style {
        Self::selected().add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(colors::fg_primary())
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(colors::fg_secondary())
    }

    pub fn text_muted() -> Style {
        Style::default().fg(colors::fg_muted())
    }

    pub fn text_accent() -> Style {
        Style::default().fg(colors::fg_accent())
    }

    pub fn text_success() -> Style {
        Style::default().fg(colors::fg_success())
    }

    pub fn text_warning() -> Style {
        Style::default().fg(colors::fg_warning())
    }

    pub fn text_error() -> Style {
        Style::default().fg(colors::fg_error())
    }

    /// Label group headers
    pub fn label() -> Style {
        Style::default()
            .fg(colors::fg_label())
            .add_modifier(Modifier::BOLD)
    }

    pub fn count() -> Style {
        Style::default()
            .fg(colors::fg_count())
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_secondary())
    }

    pub fn status_info() -> Style {
        Self::status_bar().fg(colors::fg_muted())
    }

    pub fn status_connected() -> Style {
        Self::status_bar().fg(colors::fg_success())
    }

    pub fn status_syncing() -> Style {
        Self::status_bar().fg(colors::fg_warning())
    }

    pub fn status_error() -> Style {
        Self::status_bar().fg(colors::fg_error())
    }

    pub fn error_bar() -> Style {
        Style::default()
            .bg(colors::bg_error())
            .fg(colors::bg_status())
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_key() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_desc() -> Style {
        Self::text_muted()
    }

    pub fn tab() -> Style {
        Self::text_muted()
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn border() -> Style {
        Style::default().fg(colors::border())
    }

    pub fn border_focused() -> Style {
        Style::default().fg(colors::border_focused())
    }
}

pub mod borders {
    use super::BorderType;

    pub fn popup() -> BorderType {
        BorderType::Rounded
    }

    pub fn panel() -> BorderType {
        BorderType::Rounded
    }
}

/// Apply the selection background when `selected` is set
pub fn with_selection_bg(style: Style, selected: bool) -> Style {
    if selected {
        style.bg(colors::bg_selection())
    } else {
        style
    }
}
