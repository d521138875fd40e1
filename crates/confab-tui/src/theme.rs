//! Catppuccin Mocha color palette for the overlay.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,

    // Semantic
    pub warning: Color,

    // Sender attribution
    pub user: Color,
    pub bot: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            // Backgrounds
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            // Foregrounds
            text: Color::Rgb(205, 214, 244),  // #cdd6f4
            muted: Color::Rgb(108, 112, 134), // #6c7086

            // Accents
            primary: Color::Rgb(180, 190, 254), // #b4befe (lavender)

            // Semantic
            warning: Color::Rgb(249, 226, 175), // #f9e2af (yellow)

            // Sender attribution
            user: Color::Rgb(148, 226, 213), // #94e2d5 (teal)
            bot: Color::Rgb(250, 179, 135),  // #fab387 (peach)

            // Borders
            border: Color::Rgb(69, 71, 90), // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe (lavender)
        }
    }
}
