use ratatui::style::{Color, Modifier, Style};

// Palette
pub const BRAND: Color = Color::Rgb(112, 96, 208);
pub const SIGNED_IN: Color = Color::Rgb(80, 176, 128);
pub const KEY_HINT: Color = Color::Rgb(224, 176, 96);
pub const DANGER: Color = Color::Rgb(216, 88, 96);
pub const DIM: Color = Color::Rgb(120, 124, 136);
pub const FOCUS_BG: Color = Color::Rgb(40, 36, 72);
pub const BAR_BG: Color = Color::Rgb(24, 24, 36);

pub fn title_style() -> Style {
    Style::default().fg(BRAND).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(FOCUS_BG)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn field_style() -> Style {
    Style::default().fg(Color::Gray)
}

pub fn muted_style() -> Style {
    Style::default().fg(DIM)
}

pub fn highlight_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

pub fn success_style() -> Style {
    Style::default().fg(SIGNED_IN).add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(DANGER)
}

/// Dialogs and the home panel: brand color when they have focus
pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { BRAND } else { DIM })
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BAR_BG).fg(Color::Gray)
}

pub fn key_style() -> Style {
    Style::default().fg(KEY_HINT)
}
