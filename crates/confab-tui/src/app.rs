//! Application state and key routing for the overlay.

use confab_engine::{ChatSession, PendingSend, Submission};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::Block,
    Frame,
};

use crate::theme::Theme;
use crate::widgets::{ChatPanel, Launcher, ScrollState, LAUNCHER_HINT};

/// Panel dimensions when open.
const PANEL_WIDTH: u16 = 46;
const PANEL_HEIGHT: u16 = 18;

/// Height when minimized to the title bar.
const TITLE_BAR_HEIGHT: u16 = 3;

/// Widget visibility state machine.
///
/// `Closed` retains the conversation in memory; only the launcher hint is
/// drawn. Minimizing keeps the widget open but collapses it to its title
/// bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only the launcher hint is visible.
    Closed,
    /// The panel is mounted in the overlay corner.
    Open {
        /// Collapsed to the title bar.
        minimized: bool,
    },
}

/// TUI application state.
pub struct App {
    /// The chat widget instance.
    pub session: ChatSession,
    /// Current visibility of the overlay.
    pub visibility: Visibility,
    /// Color palette.
    pub theme: Theme,
    /// Thread scroll state.
    pub scroll: ScrollState,
    /// Whether the application should exit.
    pub should_quit: bool,
}

impl App {
    /// Create the application around an already-constructed session.
    pub fn new(session: ChatSession) -> Self {
        Self {
            session,
            visibility: Visibility::Closed,
            theme: Theme::default(),
            scroll: ScrollState::new(),
            should_quit: false,
        }
    }

    /// Handle a key event.
    ///
    /// Returns a [`PendingSend`] when a submission was admitted; the caller
    /// resolves it off the UI thread and hands the outcome back to
    /// `session.finish`.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingSend> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.visibility {
            Visibility::Closed => {
                match key.code {
                    KeyCode::Enter | KeyCode::Char('o') => {
                        self.visibility = Visibility::Open { minimized: false };
                    }
                    KeyCode::Char('q') => self.should_quit = true,
                    _ => {}
                }
                None
            }
            Visibility::Open { minimized } => self.handle_open_key(key, minimized),
        }
    }

    fn handle_open_key(&mut self, key: KeyEvent, minimized: bool) -> Option<PendingSend> {
        match key.code {
            // Closing retains the conversation; only the view goes away.
            KeyCode::Esc => {
                self.visibility = Visibility::Closed;
                None
            }
            KeyCode::Tab => {
                self.visibility = Visibility::Open {
                    minimized: !minimized,
                };
                None
            }
            _ if minimized => None,
            KeyCode::Enter => match self.session.submit() {
                Submission::Sent(pending) => {
                    self.scroll.follow = true;
                    Some(pending)
                }
                Submission::Unconfigured => {
                    self.scroll.follow = true;
                    None
                }
                Submission::Ignored => None,
            },
            KeyCode::Char(c) => {
                self.session.push_draft(c);
                None
            }
            KeyCode::Backspace => {
                self.session.backspace_draft();
                None
            }
            KeyCode::Up => {
                self.scroll.scroll_up(1);
                None
            }
            KeyCode::Down => {
                self.scroll.scroll_down(1);
                None
            }
            KeyCode::PageUp => {
                self.scroll.scroll_up(10);
                None
            }
            KeyCode::PageDown => {
                self.scroll.scroll_down(10);
                None
            }
            _ => None,
        }
    }

    /// Render the host backdrop and the overlay in its current state.
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();

        // Host surface the widget overlays.
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.surface)),
            area,
        );

        match self.visibility {
            Visibility::Closed => {
                #[allow(clippy::cast_possible_truncation)]
                let hint_width = LAUNCHER_HINT.chars().count() as u16;
                let rect = overlay_area(area, hint_width, 1);
                frame.render_widget(Launcher::new(&self.theme), rect);
            }
            Visibility::Open { minimized } => {
                let height = if minimized {
                    TITLE_BAR_HEIGHT
                } else {
                    PANEL_HEIGHT
                };
                let rect = overlay_area(area, PANEL_WIDTH, height);
                let panel = ChatPanel::new(self.session.conversation(), &self.theme)
                    .configured(self.session.is_configured())
                    .minimized(minimized);
                frame.render_stateful_widget(panel, rect, &mut self.scroll);
            }
        }
    }
}

/// Anchor a widget of the given size to the bottom-right corner, with a
/// one-cell gap where space allows.
fn overlay_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = (area.x + area.width)
        .saturating_sub(width + 1)
        .max(area.x);
    let y = (area.y + area.height)
        .saturating_sub(height + 1)
        .max(area.y);
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_engine::{GREETING, KEY_MISSING_WARNING};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn unconfigured_app() -> App {
        App::new(ChatSession::new(None))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_visibility_transitions() {
        let mut app = unconfigured_app();
        assert_eq!(app.visibility, Visibility::Closed);

        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.visibility, Visibility::Open { minimized: false });

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.visibility, Visibility::Open { minimized: true });

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.visibility, Visibility::Open { minimized: false });

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.visibility, Visibility::Closed);
    }

    #[test]
    fn test_typing_edits_draft_only_while_open() {
        let mut app = unconfigured_app();

        // Closed: characters are not text input.
        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.session.draft(), "");

        app.handle_key(key(KeyCode::Char('o')));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.session.draft(), "hi");

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session.draft(), "h");

        // Minimized: typing is inert.
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.session.draft(), "h");
    }

    #[test]
    fn test_empty_submission_leaves_store_unchanged() {
        let mut app = unconfigured_app();
        app.handle_key(key(KeyCode::Char('o')));

        let before = app.session.conversation().len();
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.session.conversation().len(), before);
    }

    #[test]
    fn test_unconfigured_submission_appends_warning() {
        let mut app = unconfigured_app();
        app.handle_key(key(KeyCode::Char('o')));
        for c in "hello".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }

        assert!(app.handle_key(key(KeyCode::Enter)).is_none());

        let messages = app.session.conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "hello");
        assert_eq!(messages[2].text, KEY_MISSING_WARNING);
    }

    #[test]
    fn test_closing_retains_conversation() {
        let mut app = unconfigured_app();
        app.handle_key(key(KeyCode::Char('o')));
        for c in "kept".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        let len = app.session.conversation().len();

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.visibility, Visibility::Closed);
        assert_eq!(app.session.conversation().len(), len);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.visibility, Visibility::Open { minimized: false });
        assert_eq!(app.session.conversation().len(), len);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_state() {
        let mut app = unconfigured_app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        app.handle_key(ctrl_c);
        assert!(app.should_quit);

        let mut app = unconfigured_app();
        app.handle_key(key(KeyCode::Char('o')));
        app.handle_key(ctrl_c);
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_closed_shows_launcher_only() {
        let mut app = unconfigured_app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| app.render(frame)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("(o) chat"));
        assert!(!content.contains("Chat ["));
    }

    #[test]
    fn test_render_open_shows_seeded_message() {
        let mut app = unconfigured_app();
        app.handle_key(key(KeyCode::Char('o')));
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| app.render(frame)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("key missing"));
        assert!(content.contains("API key is not configured"));
    }

    #[test]
    fn test_render_configured_greeting() {
        // A configured session seeds the greeting; render it.
        struct NeverBackend;

        #[async_trait::async_trait]
        impl confab_engine::CompletionBackend for NeverBackend {
            async fn complete(
                &self,
                _payload: &[confab_engine::PayloadMessage],
            ) -> Result<Option<String>, confab_engine::ClientError> {
                Ok(None)
            }
        }

        let session = ChatSession::new(Some(std::sync::Arc::new(NeverBackend)));
        let mut app = App::new(session);
        app.handle_key(key(KeyCode::Char('o')));

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains(&GREETING[..20]));
    }

    #[test]
    fn test_overlay_area_clamps_to_small_terminals() {
        let tiny = Rect::new(0, 0, 10, 4);
        let rect = overlay_area(tiny, PANEL_WIDTH, PANEL_HEIGHT);
        assert!(rect.width <= tiny.width);
        assert!(rect.height <= tiny.height);
        assert!(rect.right() <= tiny.right());
        assert!(rect.bottom() <= tiny.bottom());
    }
}
