use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::models::turn::AssistantTurn;

/// Per-call sampling parameters. Unset values fall back to the provider's configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl CompletionOptions {
    pub fn new(temperature: f32, max_tokens: i32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        }
    }
}

/// Base trait for chat-completion providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next assistant turn for the full ordered message list.
    ///
    /// When `tools` is non-empty they are declared with automatic selection, so
    /// the returned turn may carry tool calls instead of content. Failures are
    /// returned as-is; retrying is the caller's decision.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &CompletionOptions,
    ) -> Result<AssistantTurn, ProviderError>;
}
