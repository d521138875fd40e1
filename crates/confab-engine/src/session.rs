//! Turn lifecycle for the chat widget.
//!
//! [`ChatSession`] composes the conversation store with the injected
//! optional backend and owns the single-slot admission gate: at most one
//! completion request is in flight at a time, so assistant replies append in
//! the same order their triggering submissions were made.

use std::sync::Arc;

use crate::client::{build_payload, CompletionBackend};
use crate::conversation::{Conversation, KEY_MISSING_WARNING};
use crate::message::Message;

/// Fixed assistant text substituted when a send fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, something went wrong while answering. Please try again.";

/// One chat widget instance: the store plus the injected optional backend.
///
/// The backend is `None` when no credential was configured at startup; that
/// state is permanent for the process lifetime and every submission then
/// short-circuits locally without any network call.
pub struct ChatSession {
    conversation: Conversation,
    backend: Option<Arc<dyn CompletionBackend>>,
}

/// What [`ChatSession::submit`] decided to do with the draft.
pub enum Submission {
    /// Draft was empty/whitespace-only, or a send is already in flight.
    /// The store is unchanged.
    Ignored,
    /// No credential; the user message and the fixed warning reply were
    /// appended locally.
    Unconfigured,
    /// Send admitted; resolve the pending send off the UI thread and hand
    /// the outcome back to [`ChatSession::finish`].
    Sent(PendingSend),
}

/// A detached in-flight send.
///
/// Carries everything the request needs by value so the caller can move it
/// into a task: the backend handle, the transcript snapshot taken before the
/// user message was appended, and the new text itself.
pub struct PendingSend {
    backend: Arc<dyn CompletionBackend>,
    transcript: Vec<Message>,
    text: String,
}

/// Reduced result of one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The endpoint replied with content.
    Reply(String),
    /// The endpoint answered without content; the turn silently produces no
    /// assistant message.
    Empty,
    /// The send failed; the fixed fallback reply is appended.
    Failed,
}

impl ChatSession {
    /// Create a session. The store is seeded with a greeting when a backend
    /// is present, with the configuration warning otherwise.
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self {
            conversation: Conversation::seeded(backend.is_some()),
            backend,
        }
    }

    /// The conversation store.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Whether a credential was configured at startup.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Whether a send is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    /// The current input buffer.
    pub fn draft(&self) -> &str {
        self.conversation.draft()
    }

    /// Replace the input buffer.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.conversation.set_draft(text);
    }

    /// Append one character to the input buffer.
    pub fn push_draft(&mut self, ch: char) {
        let mut draft = self.conversation.draft().to_string();
        draft.push(ch);
        self.conversation.set_draft(draft);
    }

    /// Remove the last character from the input buffer.
    pub fn backspace_draft(&mut self) {
        let mut draft = self.conversation.draft().to_string();
        draft.pop();
        self.conversation.set_draft(draft);
    }

    /// Submit the current draft.
    ///
    /// The transcript snapshot is taken before the user message lands in
    /// the store; the new text rides along separately (the payload builder
    /// appends the trailing user record itself).
    pub fn submit(&mut self) -> Submission {
        let text = self.conversation.draft().trim().to_string();
        if text.is_empty() || self.conversation.is_loading() {
            return Submission::Ignored;
        }

        let transcript = self.conversation.messages().to_vec();
        self.conversation.clear_draft();
        self.conversation.append(Message::user(text.clone()));

        match &self.backend {
            None => {
                self.conversation.append(Message::bot(KEY_MISSING_WARNING));
                Submission::Unconfigured
            }
            Some(backend) => {
                self.conversation.set_loading(true);
                Submission::Sent(PendingSend {
                    backend: Arc::clone(backend),
                    transcript,
                    text,
                })
            }
        }
    }

    /// Apply the outcome of a resolved send and release the admission gate.
    pub fn finish(&mut self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::Reply(text) => self.conversation.append(Message::bot(text)),
            TurnOutcome::Empty => {}
            TurnOutcome::Failed => self.conversation.append(Message::bot(FALLBACK_REPLY)),
        }
        self.conversation.set_loading(false);
    }
}

impl PendingSend {
    /// Resolve the send against the backend.
    ///
    /// Errors are reduced here: the raw cause goes to the diagnostic log and
    /// only the fixed-fallback outcome reaches the thread.
    pub async fn resolve(self) -> TurnOutcome {
        let payload = build_payload(&self.transcript, &self.text);
        match self.backend.complete(&payload).await {
            Ok(Some(reply)) => TurnOutcome::Reply(reply),
            Ok(None) => TurnOutcome::Empty,
            Err(error) => {
                tracing::warn!(%error, "completion request failed");
                TurnOutcome::Failed
            }
        }
    }
}
