use serde::{Deserialize, Serialize};

use super::tool::ToolRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }

    /// Sum two counts, keeping a field unknown only when both sides are
    pub fn accumulate(&mut self, other: &Usage) {
        fn add(a: Option<i32>, b: Option<i32>) -> Option<i32> {
            match (a, b) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            }
        }
        self.input_tokens = add(self.input_tokens, other.input_tokens);
        self.output_tokens = add(self.output_tokens, other.output_tokens);
        self.total_tokens = add(self.total_tokens, other.total_tokens);
    }
}

/// The model's answer to one chat-completion call.
///
/// A turn with tool calls is non-terminal: the calls must be executed and the
/// results sent back before the model produces its final content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolRequest>,
    #[serde(default)]
    pub usage: Usage,
}

impl AssistantTurn {
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolRequest>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.tool_calls.is_empty()
    }

    /// The content with surrounding whitespace removed, if any remains
    pub fn text_content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_accumulates() {
        let mut usage = Usage::new(Some(10), None, Some(12));
        usage.accumulate(&Usage::new(Some(5), Some(3), None));
        assert_eq!(usage, Usage::new(Some(15), Some(3), Some(12)));
    }

    #[test]
    fn test_terminal_turn() {
        let turn = AssistantTurn::text("Inter is favored");
        assert!(turn.is_terminal());
        assert_eq!(turn.text_content(), Some("Inter is favored"));
    }

    #[test]
    fn test_blank_content_is_absent() {
        let turn = AssistantTurn::text("   \n");
        assert_eq!(turn.text_content(), None);
    }

    #[test]
    fn test_tool_turn_is_not_terminal() {
        let turn = AssistantTurn::tool_calls(vec![ToolRequest::new("1", "search_matches", "{}")]);
        assert!(!turn.is_terminal());
    }
}
