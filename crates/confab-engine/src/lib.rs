//! confab-engine: headless core for the confab chat overlay
//!
//! This crate provides the widget's request/response lifecycle and local
//! conversation state, independent of any rendering layer:
//! - Message model and append-only conversation store
//! - Completion client for the hosted chat API
//! - Turn lifecycle with a single-slot admission gate

pub mod client;
pub mod conversation;
pub mod message;
pub mod session;

// Re-export commonly used types
pub use client::{
    build_payload, ClientError, CompletionBackend, OpenAiClient, PayloadMessage, Role,
    API_KEY_ENV,
};
pub use conversation::{Conversation, GREETING, KEY_MISSING_WARNING};
pub use message::{Message, Sender};
pub use session::{ChatSession, PendingSend, Submission, TurnOutcome, FALLBACK_REPLY};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
