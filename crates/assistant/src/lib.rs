//! # Task assistant core
//!
//! Message intent router and response pipeline for the personal task
//! manager: normalization, rule-cascade classification, deterministic
//! command execution against the task store, AI delegation for everything
//! else, and transport-specific reply formatting.

use std::sync::Arc;

use db::models::task::Task;
use serde_json::json;

pub mod brain;
pub mod commands;
pub mod intent;
pub mod prompt;
pub mod store;
pub mod twiml;

pub use brain::{CompletionProvider, LlmConfig, ProviderError, ProviderKind};
pub use intent::{Intent, TaskRef};
pub use store::{NewTask, SqliteTaskStore, StoreError, TaskStore};

/// Errors of the message pipeline.
///
/// `InvalidCommand` and `NotFound` carry their conversational reply text;
/// they are user-facing failures delivered at HTTP 200. `EmptyMessage` and
/// `Store` are transport-level failures (400/500). Provider failures have no
/// variant here: the delegate swallows them into the fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("empty message")]
    EmptyMessage,

    #[error("{0}")]
    InvalidCommand(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Transport encoding of a request/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Chat webhook: form fields in, escaped-XML envelope out.
    WebhookForm,
    /// Generic JSON API: `{"message"}` in, `{"reply"}` out.
    JsonApi,
}

/// A reply encoded for its transport.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedReply {
    Json(serde_json::Value),
    Xml(String),
}

/// Wrap reply text in the channel envelope. The JSON convention is
/// `{"reply": …}`; the webhook convention is the TwiML message envelope.
pub fn format_reply(reply: &str, channel: Channel) -> EncodedReply {
    match channel {
        Channel::JsonApi => EncodedReply::Json(json!({ "reply": reply })),
        Channel::WebhookForm => EncodedReply::Xml(twiml::message_response(reply)),
    }
}

/// The message router: owns the store adapter and the completion provider,
/// both injected so tests can substitute fakes. No state persists across
/// calls.
#[derive(Clone)]
pub struct Assistant {
    store: Arc<dyn TaskStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl Assistant {
    pub fn new(store: Arc<dyn TaskStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { store, provider }
    }

    /// Run one message through the pipeline and produce reply text.
    ///
    /// Conversational failures (bad arguments, unknown references) come back
    /// as `Ok` replies; only empty input and store failures are `Err`.
    pub async fn respond(&self, text: &str) -> Result<String, AssistantError> {
        let msg = intent::normalize(text)?;
        let intent = intent::classify(&msg);
        tracing::debug!(?intent, "classified message");

        match intent {
            Intent::FreeForm { text } => {
                let tasks = self.store.list_tasks().await?;
                Ok(self.delegate(&text, &tasks).await)
            }
            deterministic => match commands::execute(&deterministic, self.store.as_ref()).await {
                Ok(reply) => Ok(reply),
                Err(AssistantError::InvalidCommand(reply))
                | Err(AssistantError::NotFound(reply)) => Ok(reply),
                Err(err) => Err(err),
            },
        }
    }

    /// Forward an unmatched message to the completion provider. One attempt;
    /// any failure degrades to the fixed fallback reply so the user never
    /// sees a raw provider error.
    async fn delegate(&self, message: &str, tasks: &[Task]) -> String {
        let system = prompt::system_prompt(tasks);
        match self.provider.complete(&system, message).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("AI provider failed, using fallback reply: {err}");
                commands::fallback_reply()
            }
        }
    }
}
