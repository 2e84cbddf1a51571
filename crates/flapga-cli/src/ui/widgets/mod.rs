pub use self::{network_display::*, playfield_display::*, training_stats_display::*};

mod network_display;
mod playfield_display;
mod training_stats_display;

mod color {
    use ratatui::style::Color;

    pub const GREEN: Color = Color::Rgb(0, 200, 0);
    pub const RED: Color = Color::Rgb(255, 64, 64);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
}

pub mod style {
    use ratatui::style::{Color, Modifier, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const LABEL: Style = fg_bg(color::GRAY, color::BLACK);
    pub const HEADING: Style = fg_bg(color::CYAN, color::BLACK).add_modifier(Modifier::BOLD);
    pub const POSITIVE: Style = fg_bg(color::GREEN, color::BLACK);
    pub const NEGATIVE: Style = fg_bg(color::RED, color::BLACK);
    pub const ZERO: Style = fg_bg(color::GRAY, color::BLACK);
    pub const WARNING: Style = fg_bg(color::YELLOW, color::BLACK);

    /// Style for a signed parameter or activation.
    pub fn signed(value: f64) -> Style {
        if value > 0.0 {
            POSITIVE
        } else if value < 0.0 {
            NEGATIVE
        } else {
            ZERO
        }
    }
}
