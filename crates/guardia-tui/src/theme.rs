//! Palette (warm greys around the program's red) and shared styles.

use ratatui::style::{Color, Modifier, Style};

pub const C_ACCENT: Color = Color::Rgb(196, 52, 44);
pub const C_PLAYING: Color = Color::Rgb(110, 190, 110);
pub const C_LOADING: Color = Color::Rgb(235, 170, 70);
pub const C_ERROR: Color = Color::Rgb(240, 90, 80);
pub const C_MUTED: Color = Color::Rgb(84, 78, 74);
pub const C_SEPARATOR: Color = Color::Rgb(48, 42, 40);
pub const C_SECONDARY: Color = Color::Rgb(140, 130, 122);
pub const C_PRIMARY: Color = Color::Rgb(226, 218, 206);
pub const C_SELECTION_BG: Color = Color::Rgb(44, 30, 28);
pub const C_PANEL_BORDER: Color = Color::Rgb(52, 46, 44);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(196, 52, 44);
pub const C_NUMBER_HINT: Color = Color::Rgb(110, 98, 92);
pub const C_FILTER_BG: Color = Color::Rgb(30, 24, 22);
pub const C_FILTER_FG: Color = Color::Rgb(240, 196, 100);
pub const C_TAG: Color = Color::Rgb(120, 160, 190);
pub const C_CATEGORY: Color = Color::Rgb(150, 170, 120);
pub const C_FAVOURITE: Color = Color::Rgb(245, 200, 60);
pub const C_LISTENED: Color = Color::Rgb(90, 150, 210);
pub const C_MODE_NORMAL: Color = Color::Rgb(140, 130, 122);
pub const C_MODE_SEARCH: Color = Color::Rgb(240, 196, 100);
pub const C_HINT: Color = Color::Rgb(235, 150, 60);

// ── Styles ──────────────────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_selected_focused() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_selected() -> Style {
    Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
