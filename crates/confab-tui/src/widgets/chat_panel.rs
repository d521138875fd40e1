//! Chat panel widget.
//!
//! Combines the scrollable thread with an input line at the bottom, drawn as
//! a fixed-position overlay. Minimized mode collapses to the title bar.
//!
//! ```text
//! ┌─ Chat ──────────────────────────────┐
//! │ assistant 09:14                     │
//! │ Hi there! How can I help you today? │
//! │                                     │
//! │ you 09:15                           │
//! │ What is 2+2?                        │
//! ├─────────────────────────────────────┤
//! │ > Type a message...                 │
//! └─────────────────────────────────────┘
//! ```

use chrono::Local;
use confab_engine::Conversation;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::line,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, Widget},
};

use crate::theme::Theme;

/// Fixed height for the input line.
const INPUT_HEIGHT: u16 = 1;

/// Height for the divider line.
const DIVIDER_HEIGHT: u16 = 1;

/// Scroll state for the thread.
///
/// While `follow` is set the view sticks to the tail as messages arrive;
/// manual scrolling detaches it, and scrolling back to the tail re-engages
/// it. The offset is clamped during render, when the wrapped line count is
/// known.
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// First visible wrapped line.
    pub offset: u16,
    /// Stick to the tail as new messages arrive.
    pub follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl ScrollState {
    /// Create a new tail-following scroll state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scroll towards the top, detaching from the tail.
    pub fn scroll_up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
        self.follow = false;
    }

    /// Scroll towards the tail. Clamped at render time.
    pub fn scroll_down(&mut self, lines: u16) {
        self.offset = self.offset.saturating_add(lines);
    }
}

/// Overlay panel rendering the conversation store.
pub struct ChatPanel<'a> {
    conversation: &'a Conversation,
    theme: &'a Theme,
    configured: bool,
    minimized: bool,
}

impl<'a> ChatPanel<'a> {
    /// Create a new chat panel.
    pub fn new(conversation: &'a Conversation, theme: &'a Theme) -> Self {
        Self {
            conversation,
            theme,
            configured: true,
            minimized: false,
        }
    }

    /// Set whether a credential is configured (affects the title marker).
    #[must_use]
    pub fn configured(mut self, configured: bool) -> Self {
        self.configured = configured;
        self
    }

    /// Set whether the panel is minimized to its title bar.
    #[must_use]
    pub fn minimized(mut self, minimized: bool) -> Self {
        self.minimized = minimized;
        self
    }

    /// Build the wrapped thread lines: a sender/timestamp header per
    /// message, then its wrapped text, separated by blank lines.
    fn thread_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for message in self.conversation.messages() {
            let (tag, color) = if message.is_bot() {
                ("assistant", self.theme.bot)
            } else {
                ("you", self.theme.user)
            };
            let stamp = message.timestamp.with_timezone(&Local).format("%H:%M");

            lines.push(Line::from(vec![
                Span::styled(tag, Style::default().fg(color)),
                Span::styled(format!(" {stamp}"), Style::default().fg(self.theme.muted)),
            ]));
            for wrapped in textwrap::wrap(&message.text, width.max(1)) {
                lines.push(Line::from(Span::styled(
                    wrapped.into_owned(),
                    Style::default().fg(self.theme.text),
                )));
            }
            lines.push(Line::default());
        }

        // Drop the trailing separator.
        if !lines.is_empty() {
            lines.pop();
        }
        lines
    }

    /// Render the input line: waiting indicator while a send is in flight,
    /// the draft with a cursor otherwise.
    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let line = if self.conversation.is_loading() {
            Line::from(Span::styled(
                "● Waiting for reply...",
                Style::default().fg(self.theme.muted),
            ))
        } else {
            let draft = self.conversation.draft();
            let mut spans = vec![Span::styled("> ", Style::default().fg(self.theme.primary))];
            if draft.is_empty() {
                spans.push(Span::styled("_", Style::default().fg(self.theme.text)));
                spans.push(Span::styled(
                    "Type a message...",
                    Style::default().fg(self.theme.muted),
                ));
            } else {
                spans.push(Span::styled(
                    draft.to_string(),
                    Style::default().fg(self.theme.text),
                ));
                spans.push(Span::styled("_", Style::default().fg(self.theme.text)));
            }
            Line::from(spans)
        };

        Paragraph::new(vec![line]).render(area, buf);
    }

    /// Render a horizontal divider line.
    fn render_divider(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 {
            return;
        }

        let divider = line::HORIZONTAL.repeat(area.width as usize);
        let line = Line::from(Span::styled(
            divider,
            Style::default().fg(self.theme.border),
        ));
        Paragraph::new(vec![line]).render(area, buf);
    }
}

impl StatefulWidget for ChatPanel<'_> {
    type State = ScrollState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ScrollState) {
        let (title, title_color) = if self.configured {
            (" Chat ", self.theme.text)
        } else {
            (" Chat [key missing] ", self.theme.warning)
        };

        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(title_color))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.minimized || inner.height < INPUT_HEIGHT + DIVIDER_HEIGHT + 1 {
            // Title bar only.
            return;
        }

        let thread_height = inner.height - INPUT_HEIGHT - DIVIDER_HEIGHT;
        let thread_area = Rect::new(inner.x, inner.y, inner.width, thread_height);
        let divider_area = Rect::new(inner.x, inner.y + thread_height, inner.width, DIVIDER_HEIGHT);
        let input_area = Rect::new(
            inner.x,
            inner.y + thread_height + DIVIDER_HEIGHT,
            inner.width,
            INPUT_HEIGHT,
        );

        let lines = self.thread_lines(thread_area.width as usize);
        #[allow(clippy::cast_possible_truncation)]
        let total = lines.len() as u16;
        let max_offset = total.saturating_sub(thread_area.height);
        if state.follow {
            state.offset = max_offset;
        } else {
            state.offset = state.offset.min(max_offset);
            if state.offset == max_offset {
                state.follow = true;
            }
        }

        Paragraph::new(lines)
            .scroll((state.offset, 0))
            .render(thread_area, buf);

        self.render_divider(divider_area, buf);
        self.render_input(input_area, buf);
    }
}
