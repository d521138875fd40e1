//! Append-only conversation store.
//!
//! The store holds the ordered message sequence plus the transient flags the
//! engine owns: the current draft text and the single-slot loading gate.
//! Visibility (open/closed/minimized) belongs to the presentation layer.

use crate::message::Message;

/// Greeting seeded as the first message when a credential is configured.
pub const GREETING: &str = "Hi there! How can I help you today?";

/// Warning seeded (and appended per turn) when no credential is configured.
pub const KEY_MISSING_WARNING: &str =
    "API key is not configured. Set the OPENAI_API_KEY environment variable to enable replies.";

/// The ordered message sequence for one widget instance.
///
/// The transcript is write-only from the consumer's perspective beyond the
/// seeded first record: messages can be appended but never edited, removed,
/// or reordered.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    draft: String,
    loading: bool,
}

impl Conversation {
    /// Create a store seeded with exactly one synthetic assistant message,
    /// chosen by whether a credential is present.
    pub fn seeded(configured: bool) -> Self {
        let first = if configured {
            Message::bot(GREETING)
        } else {
            Message::bot(KEY_MISSING_WARNING)
        };
        Self {
            messages: vec![first],
            draft: String::new(),
            loading: false,
        }
    }

    /// The ordered message sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the thread.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the thread is empty (never true after seeding).
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Add a message to the end of the sequence. Cannot fail.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The current input buffer.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the input buffer; content is unconstrained.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Reset the input buffer, called when a submission is accepted.
    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Whether a send is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set the in-flight gate.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}
