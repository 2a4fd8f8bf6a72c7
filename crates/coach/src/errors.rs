use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum CoachError {
    #[error("unrecognized tool: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Store query failed: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoachResult<T> = Result<T, CoachError>;

/// Failures of a chat-completion call. These are transport-level and are
/// surfaced to the caller instead of being folded into the conversation.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to the completion endpoint timed out")]
    Timeout,

    #[error("Completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
