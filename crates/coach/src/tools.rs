//! The capabilities the coach exposes to the model.
//!
//! Each tool is a read-only query over the match store (or the web search
//! API). Tools are registered once in a [`registry::ToolRegistry`], which is
//! the single entry point the orchestration loop dispatches through.
pub mod accuracy;
pub mod args;
pub mod details;
pub mod fixtures;
pub mod registry;
pub mod search;
pub mod standings;
pub mod web_search;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoachResult;
use crate::models::tool::Tool;
use args::{ToolArgs, ToolKind};

pub use registry::ToolRegistry;

/// A tool that can be called by the model
#[async_trait]
pub trait CoachTool: Send + Sync {
    fn kind(&self) -> ToolKind;

    /// The declaration sent to the model. Its name is `kind().as_ref()`.
    fn declaration(&self) -> &Tool;

    /// Run the tool. A `Value::String` result is handed to the model as plain
    /// text, anything else as serialized JSON.
    async fn execute(&self, args: ToolArgs) -> CoachResult<Value>;
}
