use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolRequest;
use super::turn::AssistantTurn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
/// A message to or from an LLM
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolRequest>,
    },
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Create an assistant message carrying only text
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Create the result message answering the tool call `id`
    pub fn tool_response<I, N, C>(id: I, name: N, content: C) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        Message::Tool {
            tool_call_id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
            Message::Tool { .. } => Role::Tool,
        }
    }

    /// Get the text content, if the message carries any
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content }
            | Message::User { content }
            | Message::Tool { content, .. } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
        }
    }

    pub fn tool_requests(&self) -> &[ToolRequest] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn as_tool_response(&self) -> Option<(&str, &str)> {
        match self {
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => Some((tool_call_id, content)),
            _ => None,
        }
    }
}

impl From<AssistantTurn> for Message {
    fn from(turn: AssistantTurn) -> Self {
        Message::Assistant {
            content: turn.content,
            tool_calls: turn.tool_calls,
        }
    }
}

/// The ordered message list of a single chat request.
///
/// Holds exactly one system message, always first. It only ever grows, and it
/// is owned by the request that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Replay earlier turns supplied by the caller. System messages in the
    /// history are dropped so the conversation keeps its single system prompt.
    pub fn with_history<I>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = Message>,
    {
        self.messages.extend(
            history
                .into_iter()
                .filter(|message| message.role() != Role::System),
        );
        self
    }

    pub fn with_user<S: Into<String>>(mut self, content: S) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
