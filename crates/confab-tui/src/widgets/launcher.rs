//! Closed-state launcher hint.
//!
//! When the widget is closed, only this one-line affordance is drawn in the
//! overlay corner; the conversation stays in memory behind it.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Hint text shown while the widget is closed.
pub const LAUNCHER_HINT: &str = " (o) chat ";

/// One-line launcher anchored where the panel would open.
pub struct Launcher<'a> {
    theme: &'a Theme,
}

impl<'a> Launcher<'a> {
    /// Create a new launcher hint.
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for Launcher<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(
            LAUNCHER_HINT,
            Style::default()
                .fg(self.theme.base)
                .bg(self.theme.primary),
        ));
        Paragraph::new(vec![line]).render(area, buf);
    }
}
