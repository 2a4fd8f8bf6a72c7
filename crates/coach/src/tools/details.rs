use async_trait::async_trait;
use serde_json::Value;

use super::args::{ToolArgs, ToolKind};
use super::CoachTool;
use crate::context::ContextBuilder;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::{ParamKind, Tool, ToolParameter};

/// Full description of one match, through the context builder
pub struct MatchDetailsTool {
    context: ContextBuilder,
    declaration: Tool,
}

impl MatchDetailsTool {
    pub fn new(context: ContextBuilder) -> Self {
        let declaration = Tool::new(
            ToolKind::GetMatchDetails.as_ref(),
            "Get the detailed analysis data of one match: odds, probabilities, indicators, \
            form and comments. Team names must be exact; use search_matches first if unsure.",
            vec![
                ToolParameter::required("home", ParamKind::String, "Exact home team name"),
                ToolParameter::required("away", ParamKind::String, "Exact away team name"),
                ToolParameter::optional(
                    "date",
                    ParamKind::String,
                    "Match date in YYYY-MM-DD format, if known",
                ),
            ],
        );
        Self {
            context,
            declaration,
        }
    }
}

#[async_trait]
impl CoachTool for MatchDetailsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GetMatchDetails
    }

    fn declaration(&self) -> &Tool {
        &self.declaration
    }

    async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
        let ToolArgs::MatchDetails { home, away, date } = args else {
            return Err(CoachError::InvalidParameters(
                "expected home and away teams".to_string(),
            ));
        };

        let text = match self.context.build(&home, &away, date).await? {
            Some(context) => context.rendered_text,
            None => match date {
                Some(date) => format!("No data available for {} vs {} on {}.", home, away, date),
                None => format!("No data available for {} vs {}.", home, away),
            },
        };
        Ok(Value::String(text))
    }
}
