use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write;
use std::time::Duration;

use super::args::{ToolArgs, ToolKind};
use super::CoachTool;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::{ParamKind, Tool, ToolParameter};

pub const SEARCH_HOST: &str = "https://api.tavily.com";
pub const NOT_CONFIGURED: &str =
    "Web search is not configured (no search API key). Answer using the match data tools only.";

#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub max_results: u32,
    pub timeout: Duration,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            host: SEARCH_HOST.to_string(),
            api_key: None,
            max_results: 5,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Searches the web for recent news (injuries, line-ups, transfers)
pub struct WebSearchTool {
    client: Client,
    config: WebSearchConfig,
    declaration: Tool,
}

impl WebSearchTool {
    pub fn new(config: WebSearchConfig) -> CoachResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoachError::Internal(e.to_string()))?;
        let declaration = Tool::new(
            ToolKind::WebSearch.as_ref(),
            "Search the web for recent football news that is not in the match data: injuries, \
            suspensions, expected line-ups, coach changes.",
            vec![ToolParameter::required(
                "query",
                ParamKind::String,
                "Search query, e.g. 'Inter injuries October 2026'",
            )],
        );
        Ok(Self {
            client,
            config,
            declaration,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn search(&self, api_key: &str, query: &str) -> CoachResult<Vec<SearchHit>> {
        let url = format!("{}/search", self.config.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": api_key,
                "query": query,
                "max_results": self.config.max_results,
            }))
            .send()
            .await
            .map_err(|e| CoachError::ExecutionError(format!("web search failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoachError::ExecutionError(format!(
                "web search returned {}",
                status
            )));
        }
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CoachError::ExecutionError(format!("invalid web search reply: {}", e)))?;
        Ok(body.results)
    }
}

#[async_trait]
impl CoachTool for WebSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn declaration(&self) -> &Tool {
        &self.declaration
    }

    async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
        let ToolArgs::WebSearch { query } = args else {
            return Err(CoachError::InvalidParameters(
                "expected a search query".to_string(),
            ));
        };
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Ok(Value::String(NOT_CONFIGURED.to_string()));
        };

        let hits = self.search(api_key, &query).await?;
        if hits.is_empty() {
            return Ok(Value::String(format!("No web results for '{}'.", query)));
        }

        let mut text = String::new();
        for (index, hit) in hits.iter().enumerate() {
            let _ = writeln!(text, "{}. {} ({})", index + 1, hit.title, hit.url);
            if !hit.content.is_empty() {
                let _ = writeln!(text, "   {}", hit.content.trim());
            }
        }
        Ok(Value::String(text.trim_end().to_string()))
    }
}
