//! Completion client for the hosted chat API.
//!
//! Wraps one OpenAI-style chat completions endpoint: the full transcript is
//! mapped to role-tagged records and sent with fixed generation parameters,
//! and the response is reduced to the first choice's content. The wire
//! schema beyond that shape is owned by the provider and treated as a black
//! box.

use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Hosted completions endpoint.
const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model identifier sent with every request.
const MODEL: &str = "gpt-3.5-turbo";

/// Sampling temperature. Fixed, not user-adjustable.
const TEMPERATURE: f32 = 0.7;

/// Maximum reply length in tokens.
const MAX_TOKENS: u32 = 500;

/// System instruction prepended to every request.
const SYSTEM_PROMPT: &str =
    "You are a friendly assistant embedded in a chat widget. Keep replies short and helpful.";

/// Role tag on an outbound payload record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction.
    System,
    /// Human-entered content.
    User,
    /// Model-generated content.
    Assistant,
}

/// One role-tagged record in the outbound payload.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadMessage {
    /// Role of the record author.
    pub role: Role,
    /// Record content.
    pub content: String,
}

/// Request body for one completion call.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'static str,
    messages: &'a [PayloadMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Response body; only the shape we consume.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Build the ordered payload for one turn.
///
/// `transcript` is the pre-submission snapshot and `new_text` is always
/// passed separately; the trailing user record is appended here, so the
/// latest message can be neither duplicated nor dropped by the caller.
pub fn build_payload(transcript: &[Message], new_text: &str) -> Vec<PayloadMessage> {
    let mut payload = Vec::with_capacity(transcript.len() + 2);
    payload.push(PayloadMessage {
        role: Role::System,
        content: SYSTEM_PROMPT.to_string(),
    });
    for message in transcript {
        payload.push(PayloadMessage {
            role: if message.is_bot() {
                Role::Assistant
            } else {
                Role::User
            },
            content: message.text.clone(),
        });
    }
    payload.push(PayloadMessage {
        role: Role::User,
        content: new_text.to_string(),
    });
    payload
}

/// Reduce a parsed response to the first choice's content.
///
/// Whitespace-only content counts as no content.
fn first_content(response: CompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
}

/// Abstraction over the completion transport.
///
/// The widget receives this as an explicitly constructed, injected value so
/// tests can substitute a double; there is no module-level singleton.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one payload and reduce the response to its first choice's
    /// content. `Ok(None)` means the endpoint answered without content.
    async fn complete(&self, payload: &[PayloadMessage]) -> Result<Option<String>, ClientError>;
}

/// Client for the hosted OpenAI-style completions endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl OpenAiClient {
    /// Create a client with the given credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            url: COMPLETIONS_URL.to_string(),
        }
    }

    /// Read the credential from the environment, once at startup.
    ///
    /// Returns `None` when the variable is unset or blank. Callers treat
    /// that as the degraded mode for the remainder of the process lifetime;
    /// initialization is never retried.
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(Self::new)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, payload: &[PayloadMessage]) -> Result<Option<String>, ClientError> {
        let request = CompletionRequest {
            model: MODEL,
            messages: payload,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status });
        }

        let body = response.text().await?;
        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(ClientError::Parse)?;
        Ok(first_content(parsed))
    }
}

/// Errors from the completion transport.
///
/// These never reach the user verbatim; the session reduces them to the
/// fixed fallback reply and logs the cause.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status.
    #[error("completion endpoint returned {status}")]
    Status {
        /// The HTTP status code received.
        status: reqwest::StatusCode,
    },

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_starts_with_system_and_ends_with_new_text() {
        let transcript = vec![Message::bot("Hi there!"), Message::user("hello")];
        let payload = build_payload(&transcript, "What is 2+2?");

        assert_eq!(payload.len(), 4);
        assert_eq!(payload[0].role, Role::System);
        assert_eq!(payload[0].content, SYSTEM_PROMPT);
        assert_eq!(payload[1].role, Role::Assistant);
        assert_eq!(payload[1].content, "Hi there!");
        assert_eq!(payload[2].role, Role::User);
        assert_eq!(payload[3].role, Role::User);
        assert_eq!(payload[3].content, "What is 2+2?");
    }

    #[test]
    fn test_payload_excludes_nothing_and_adds_nothing() {
        // Empty transcript still yields system + trailing user record.
        let payload = build_payload(&[], "hi");
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].role, Role::System);
        assert_eq!(payload[1].content, "hi");
    }

    #[test]
    fn test_request_serialization_carries_fixed_parameters() {
        let payload = build_payload(&[], "hi");
        let request = CompletionRequest {
            model: MODEL,
            messages: &payload,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 500);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_first_content_extracts_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"2+2 is 4."}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_content(parsed), Some("2+2 is 4.".to_string()));
    }

    #[test]
    fn test_first_content_handles_missing_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_content(parsed), None);

        let body = r#"{"choices":[]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_content(parsed), None);

        let body = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_content(parsed), None);
    }

    #[test]
    fn test_malformed_body_is_a_parse_error() {
        let result: Result<CompletionResponse, _> = serde_json::from_str("not json");
        assert!(result.is_err());
    }
}
