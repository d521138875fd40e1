//! Widgets for the chat overlay.

mod chat_panel;
mod launcher;

pub use chat_panel::{ChatPanel, ScrollState};
pub use launcher::{Launcher, LAUNCHER_HINT};
