use async_trait::async_trait;
use serde_json::Value;

use super::args::{ToolArgs, ToolKind};
use super::CoachTool;
use crate::context::ContextBuilder;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::{ParamKind, Tool, ToolParameter};

/// Fuzzy team-name search over all fixture collections
pub struct SearchMatchesTool {
    context: ContextBuilder,
    declaration: Tool,
}

impl SearchMatchesTool {
    pub fn new(context: ContextBuilder) -> Self {
        let declaration = Tool::new(
            ToolKind::SearchMatches.as_ref(),
            "Search upcoming and recent matches by a partial team name. Returns up to 10 \
            matches with their exact team names, date and competition. Call this first when \
            the user names a team loosely.",
            vec![ToolParameter::required(
                "query",
                ParamKind::String,
                "Part of a team name, e.g. 'Inter' or 'Real'",
            )],
        );
        Self {
            context,
            declaration,
        }
    }
}

#[async_trait]
impl CoachTool for SearchMatchesTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SearchMatches
    }

    fn declaration(&self) -> &Tool {
        &self.declaration
    }

    async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
        let ToolArgs::SearchMatches { query } = args else {
            return Err(CoachError::InvalidParameters(
                "expected a search query".to_string(),
            ));
        };
        let candidates = self.context.search(&query).await?;
        serde_json::to_value(candidates).map_err(|e| CoachError::Internal(e.to_string()))
    }
}
