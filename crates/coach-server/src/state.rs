use coach::agent::ToolLoop;
use coach::context::ContextBuilder;
use coach::errors::CoachResult;
use coach::providers::base::{CompletionOptions, Provider};
use coach::tools::web_search::WebSearchConfig;
use coach::tools::ToolRegistry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn Provider>,
    pub context: ContextBuilder,
    pub tool_loop: Arc<ToolLoop>,
    /// Options for the single-shot analyzer, which writes longer answers
    pub analyst_options: CompletionOptions,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn Provider>,
        context: ContextBuilder,
        web_search: WebSearchConfig,
    ) -> CoachResult<Self> {
        let registry = Arc::new(ToolRegistry::standard(context.clone(), web_search)?);
        let tool_loop = ToolLoop::new(provider.clone(), registry);
        Ok(Self {
            provider,
            context,
            tool_loop: Arc::new(tool_loop),
            analyst_options: CompletionOptions {
                temperature: Some(0.4),
                max_tokens: Some(1500),
            },
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.tool_loop.registry()
    }
}
