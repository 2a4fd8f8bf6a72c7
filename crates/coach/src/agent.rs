use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::models::message::{Conversation, Message};
use crate::models::tool::ToolRequest;
use crate::models::turn::{AssistantTurn, Usage};
use crate::providers::base::{CompletionOptions, Provider};
use crate::tools::registry::error_payload;
use crate::tools::ToolRegistry;

/// Maximum number of tool dispatch rounds for one reply
pub const MAX_ROUNDS: usize = 5;

pub const EMPTY_ANSWER: &str =
    "Sorry, I could not put an answer together. Could you rephrase your question?";
pub const ROUND_LIMIT_REACHED: &str =
    "I looked up a lot of data but reached my research limit before concluding. \
    Try asking about a single match or team.";

enum LoopState {
    AwaitingModel(AssistantTurn),
    DispatchingTools(AssistantTurn),
    Terminal { answer: String, forced_stop: bool },
}

/// Result of resolving one user turn
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub answer: String,
    /// Number of tool dispatch rounds that ran
    pub rounds: usize,
    /// True when the round cap ended the exchange while the model still wanted tools
    pub forced_stop: bool,
    pub usage: Usage,
    /// Full transcript, ending with the final assistant answer
    pub messages: Vec<Message>,
}

/// Drives the exchange between the model and the tool registry until the
/// model answers in plain text or the round cap is hit
pub struct ToolLoop {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    options: CompletionOptions,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Ask the model for the first turn, then resolve it
    pub async fn reply(&self, conversation: Conversation) -> Result<LoopOutcome, ProviderError> {
        let first_turn = self.complete(&conversation).await?;
        self.resolve(conversation, first_turn).await
    }

    /// Resolve `first_turn`, the model's answer to `conversation`, into a final answer.
    ///
    /// Only provider failures are returned as errors. Tool failures are handed
    /// back to the model and the round cap ends the exchange gracefully.
    pub async fn resolve(
        &self,
        mut conversation: Conversation,
        first_turn: AssistantTurn,
    ) -> Result<LoopOutcome, ProviderError> {
        let mut rounds = 0;
        let mut usage = first_turn.usage.clone();
        let mut state = LoopState::AwaitingModel(first_turn);

        loop {
            state = match state {
                LoopState::AwaitingModel(turn) if turn.is_terminal() => LoopState::Terminal {
                    answer: turn.text_content().unwrap_or(EMPTY_ANSWER).to_string(),
                    forced_stop: false,
                },
                LoopState::AwaitingModel(turn) if rounds >= MAX_ROUNDS => {
                    tracing::warn!(
                        rounds,
                        pending_calls = turn.tool_calls.len(),
                        "round limit reached, stopping tool dispatch"
                    );
                    LoopState::Terminal {
                        answer: turn
                            .text_content()
                            .unwrap_or(ROUND_LIMIT_REACHED)
                            .to_string(),
                        forced_stop: true,
                    }
                }
                LoopState::AwaitingModel(turn) => LoopState::DispatchingTools(turn),
                LoopState::DispatchingTools(turn) => {
                    rounds += 1;
                    self.dispatch(&mut conversation, turn, rounds).await;
                    let next = self.complete(&conversation).await?;
                    usage.accumulate(&next.usage);
                    LoopState::AwaitingModel(next)
                }
                LoopState::Terminal {
                    answer,
                    forced_stop,
                } => {
                    tracing::info!(
                        rounds,
                        forced_stop,
                        input_tokens = ?usage.input_tokens,
                        output_tokens = ?usage.output_tokens,
                        "reply resolved"
                    );
                    conversation.push(Message::assistant(answer.clone()));
                    return Ok(LoopOutcome {
                        answer,
                        rounds,
                        forced_stop,
                        usage,
                        messages: conversation.into_messages(),
                    });
                }
            };
        }
    }

    async fn complete(&self, conversation: &Conversation) -> Result<AssistantTurn, ProviderError> {
        self.provider
            .complete(
                conversation.messages(),
                self.registry.declarations(),
                &self.options,
            )
            .await
    }

    /// Append the tool-calling turn, run every call and append one result per call id
    async fn dispatch(&self, conversation: &mut Conversation, turn: AssistantTurn, round: usize) {
        let requests = turn.tool_calls.clone();
        tracing::info!(
            round,
            calls = requests.len(),
            tools = ?requests.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "dispatching tool calls"
        );
        conversation.push(Message::from(turn));

        let futures: Vec<_> = requests
            .iter()
            .map(|request| self.run_call(request))
            .collect();
        // Executions run concurrently, results keep the emission order
        let outputs = join_all(futures).await;

        for (request, output) in requests.iter().zip(outputs) {
            conversation.push(Message::tool_response(&request.id, &request.name, output));
        }
    }

    async fn run_call(&self, request: &ToolRequest) -> String {
        let execution = self.registry.execute(&request.name, &request.arguments);
        let output = match AssertUnwindSafe(execution).catch_unwind().await {
            Ok(output) => output,
            Err(_) => {
                tracing::error!(tool = %request.name, id = %request.id, "tool call panicked");
                error_payload("tool execution failed")
            }
        };
        tracing::debug!(tool = %request.name, id = %request.id, bytes = output.len(), "tool call finished");
        output
    }
}
