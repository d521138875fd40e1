//! confab-tui: terminal overlay surface for the confab chat widget
//!
//! This crate renders the engine's conversation store as a fixed-position
//! overlay in the bottom-right corner of the terminal and translates key
//! events into store and client operations. It holds no conversation state
//! of its own.

mod app;
mod event;
mod theme;
mod widgets;

pub use app::{App, Visibility};
pub use event::{Event, EventHandler};
pub use theme::Theme;

pub use confab_engine;

use confab_engine::{ChatSession, TurnOutcome};
use crossterm::{
    cursor::Show as ShowCursor,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tokio::task::JoinHandle;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the overlay around an already-constructed session.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit. The session (and with it the conversation) is dropped when this
/// returns; nothing is persisted.
pub async fn run_tui(session: ChatSession) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    // At most one send is in flight; the session's gate enforces it, this
    // slot just carries the task handle.
    let mut pending: Option<JoinHandle<TurnOutcome>> = None;

    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Apply a completed send (non-blocking check).
        if pending.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = pending.take() {
                let outcome = handle.await.unwrap_or(TurnOutcome::Failed);
                app.session.finish(outcome);
            }
        }

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if let Some(send) = app.handle_key(key) {
                        pending = Some(tokio::spawn(send.resolve()));
                    }
                }
                Event::Tick | Event::Resize(..) => {}
            }
        }

        if app.should_quit {
            // Abandon any in-flight request; its resolution must not touch
            // a store nobody observes anymore.
            if let Some(handle) = pending.take() {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}
