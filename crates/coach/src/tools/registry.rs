use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::accuracy::PredictionStatsTool;
use super::args::{ToolArgs, ToolKind};
use super::details::MatchDetailsTool;
use super::fixtures::MatchesByDateTool;
use super::search::SearchMatchesTool;
use super::standings::StandingsTool;
use super::web_search::{WebSearchConfig, WebSearchTool};
use super::CoachTool;
use crate::context::ContextBuilder;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::Tool;

/// Maps tool names to their implementations
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn CoachTool>>,
    declarations: Vec<Tool>,
    today: Option<NaiveDate>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            declarations: Vec::new(),
            today: None,
        }
    }

    /// Pin the date relative arguments ("today", "tomorrow") resolve against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The six coach tools over one store, plus web search
    pub fn standard(context: ContextBuilder, web: WebSearchConfig) -> CoachResult<Self> {
        let mut registry = Self::new();
        registry.today = context.pinned_today();
        registry.register(Arc::new(MatchesByDateTool::new(context.store().clone())))?;
        registry.register(Arc::new(SearchMatchesTool::new(context.clone())))?;
        registry.register(Arc::new(MatchDetailsTool::new(context.clone())))?;
        registry.register(Arc::new(StandingsTool::new(context.clone())))?;
        registry.register(Arc::new(PredictionStatsTool::new(context)))?;
        registry.register(Arc::new(WebSearchTool::new(web)?))?;
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn CoachTool>) -> CoachResult<()> {
        let kind = tool.kind();
        if self.tools.contains_key(&kind) {
            return Err(CoachError::Internal(format!(
                "tool {} is already registered",
                kind
            )));
        }
        if tool.declaration().name != kind.as_ref() {
            return Err(CoachError::Internal(format!(
                "tool {} declares itself as {}",
                kind,
                tool.declaration().name
            )));
        }
        self.declarations.push(tool.declaration().clone());
        self.tools.insert(kind, tool);
        Ok(())
    }

    /// Declarations in registration order
    pub fn declarations(&self) -> &[Tool] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        ToolKind::from_name(name).map_or(false, |kind| self.tools.contains_key(&kind))
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Run the tool called `name` with the model's raw argument string.
    ///
    /// Never fails: unknown tools, unreadable arguments and tool failures all
    /// come back as a `{"error": ...}` payload for the model to read.
    pub async fn execute(&self, name: &str, raw_arguments: &str) -> String {
        match self.try_execute(name, raw_arguments).await {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "tool call failed");
                error_payload(&err.to_string())
            }
        }
    }

    async fn try_execute(&self, name: &str, raw_arguments: &str) -> CoachResult<Value> {
        let tool = ToolKind::from_name(name)
            .and_then(|kind| self.tools.get(&kind))
            .ok_or_else(|| CoachError::ToolNotFound(name.to_string()))?;

        let args = ToolArgs::parse(tool.kind(), raw_arguments, self.today())?;
        tracing::debug!(tool = name, ?args, "executing tool");

        tool.execute(args).await
    }
}

pub fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{date, sample_store};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn registry() -> ToolRegistry {
        let context = ContextBuilder::new(sample_store()).with_today(date("2026-10-16"));
        ToolRegistry::standard(context, WebSearchConfig::default()).unwrap()
    }

    fn error_of(payload: &str) -> String {
        let value: Value = serde_json::from_str(payload).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    struct RecordingTool {
        declaration: Tool,
        calls: Mutex<Vec<ToolArgs>>,
    }

    impl RecordingTool {
        fn new() -> Self {
            Self {
                declaration: Tool::new(ToolKind::SearchMatches.as_ref(), "records", vec![]),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CoachTool for RecordingTool {
        fn kind(&self) -> ToolKind {
            ToolKind::SearchMatches
        }

        fn declaration(&self) -> &Tool {
            &self.declaration
        }

        async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
            self.calls.lock().unwrap().push(args);
            Ok(json!(["ok"]))
        }
    }

    #[test]
    fn test_standard_declarations_in_order() {
        let names: Vec<String> = registry()
            .declarations()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "get_matches_by_date",
                "search_matches",
                "get_match_details",
                "get_standings",
                "get_prediction_stats",
                "web_search",
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(RecordingTool::new())).unwrap();
        let err = registry.register(Arc::new(RecordingTool::new())).unwrap_err();
        assert!(matches!(err, CoachError::Internal(_)));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_payload() {
        let payload = registry().execute("book_flight", "{}").await;
        assert_eq!(error_of(&payload), "unrecognized tool: book_flight");
    }

    #[tokio::test]
    async fn test_missing_argument_is_error_payload() {
        let payload = registry().execute("get_match_details", "{}").await;
        assert!(error_of(&payload).contains("home"));
    }

    #[tokio::test]
    async fn test_raw_text_arguments_become_query() {
        let tool = Arc::new(RecordingTool::new());
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone()).unwrap();

        let payload = registry.execute("search_matches", "inter").await;
        assert_eq!(payload, r#"["ok"]"#);
        assert_eq!(
            tool.calls.lock().unwrap().as_slice(),
            &[ToolArgs::SearchMatches {
                query: "inter".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_text_results_are_not_quoted() {
        let payload = registry()
            .execute("get_match_details", r#"{"home": "Inter", "away": "AC Milan"}"#)
            .await;
        assert!(payload.starts_with("Match: Inter vs AC Milan"));
    }

    #[tokio::test]
    async fn test_relative_dates_use_pinned_today() {
        let payload = registry()
            .execute("get_matches_by_date", r#"{"date": "in two days"}"#)
            .await;
        assert!(error_of(&payload).contains("date"));

        let payload = registry()
            .execute("get_matches_by_date", r#"{"date": "today"}"#)
            .await;
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["date"], "2026-10-16");
    }
}
