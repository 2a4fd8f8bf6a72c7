//! System prompts for the coach.
//!
//! A prompt is rendered once per request from a [`PromptVariant`] and the
//! request's inputs, then handed to the conversation as an immutable value.
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::errors::{CoachError, CoachResult};
use crate::models::message::Conversation;
use crate::models::tool::Tool;
use crate::prompt_template::load_prompt_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptVariant {
    /// Conversational coach with tools
    Coach,
    /// Coach answering from the prediction dashboard
    Dashboard,
    /// Single-shot premium match analysis, no tools
    Analyst,
}

impl PromptVariant {
    /// Pick the chat variant for the page the user is on
    pub fn for_page(page_context: Option<&str>) -> Self {
        match page_context.map(|page| page.trim().to_lowercase()) {
            Some(page) if page.starts_with("dashboard") => PromptVariant::Dashboard,
            _ => PromptVariant::Coach,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            PromptVariant::Coach => "coach.md",
            PromptVariant::Dashboard => "dashboard.md",
            PromptVariant::Analyst => "analyst.md",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptInputs {
    pub today: Option<NaiveDate>,
    pub page_context: Option<String>,
    pub is_admin: bool,
    /// Rendered match description, when the request is about one match
    pub match_context: Option<String>,
}

#[derive(Serialize)]
struct ToolSummary<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct PromptContext<'a> {
    today: String,
    page_context: Option<&'a str>,
    is_admin: bool,
    match_context: Option<&'a str>,
    tools: Vec<ToolSummary<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemPrompt {
    variant: PromptVariant,
    text: String,
}

impl SystemPrompt {
    pub fn render(
        variant: PromptVariant,
        inputs: &PromptInputs,
        tools: &[Tool],
    ) -> CoachResult<Self> {
        let match_context = inputs
            .match_context
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        if variant == PromptVariant::Analyst && match_context.is_none() {
            return Err(CoachError::InvalidParameters(
                "the analyst prompt needs a match context".to_string(),
            ));
        }

        let today = inputs.today.unwrap_or_else(|| Local::now().date_naive());
        let context = PromptContext {
            today: today.format("%A %d %B %Y").to_string(),
            page_context: inputs
                .page_context
                .as_deref()
                .filter(|page| !page.trim().is_empty()),
            is_admin: inputs.is_admin,
            match_context,
            tools: tools
                .iter()
                .map(|tool| ToolSummary {
                    name: &tool.name,
                    description: &tool.description,
                })
                .collect(),
        };

        let text = load_prompt_file(variant.template(), &context)
            .map_err(|e| CoachError::Internal(format!("failed to render prompt: {}", e)))?;
        Ok(Self {
            variant,
            text: text.trim().to_string(),
        })
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start a conversation with this prompt as its system message
    pub fn conversation(&self) -> Conversation {
        Conversation::new(self.text.clone())
    }
}
