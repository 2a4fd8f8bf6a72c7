use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{CompletionOptions, Provider};
use super::configs::MistralProviderConfig;
use super::utils::{messages_to_openai_spec, openai_response_to_turn, tools_to_openai_spec};
use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::models::turn::AssistantTurn;

/// Chat-completion client for Mistral's OpenAI-compatible endpoint
pub struct MistralProvider {
    client: Client,
    config: MistralProviderConfig,
}

impl MistralProvider {
    pub fn new(config: MistralProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Provider for MistralProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &CompletionOptions,
    ) -> Result<AssistantTurn, ProviderError> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
        });

        if !tools.is_empty() {
            payload["tools"] = json!(tools_to_openai_spec(tools)?);
            payload["tool_choice"] = json!("auto");
        }
        if let Some(temp) = options.temperature.or(self.config.temperature) {
            payload["temperature"] = json!(temp);
        }
        if let Some(tokens) = options.max_tokens.or(self.config.max_tokens) {
            payload["max_tokens"] = json!(tokens);
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(ProviderError::InvalidResponse(format!(
                "Mistral API error: {}",
                error
            )));
        }

        let turn = openai_response_to_turn(&response)?;
        tracing::debug!(
            model = %self.config.model,
            tool_calls = turn.tool_calls.len(),
            total_tokens = ?turn.usage.total_tokens,
            "completion received"
        );
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::{ParamKind, ToolParameter};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> MistralProviderConfig {
        MistralProviderConfig {
            host: server.uri(),
            api_key: "test_api_key".to_string(),
            model: "mistral-small-latest".to_string(),
            temperature: Some(0.7),
            max_tokens: None,
            timeout: Duration::from_secs(5),
        }
    }

    async fn setup_mock_server(response: ResponseTemplate) -> (MockServer, MistralProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test_api_key"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let provider = MistralProvider::new(config_for(&mock_server)).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_complete_basic() -> anyhow::Result<()> {
        let response_body = json!({
            "id": "cmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Inter is favored.",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        });

        let (_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let messages = vec![Message::system("coach"), Message::user("Inter or Milan?")];
        let turn = provider
            .complete(&messages, &[], &CompletionOptions::default())
            .await?;

        assert!(turn.is_terminal());
        assert_eq!(turn.text_content(), Some("Inter is favored."));
        assert_eq!(turn.usage.input_tokens, Some(12));
        assert_eq!(turn.usage.total_tokens, Some(27));
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_declares_tools_with_auto_choice() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "temperature": 0.2,
                "max_tokens": 400,
                "tools": [{"type": "function", "function": {"name": "search_matches"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_123",
                            "type": "function",
                            "function": {
                                "name": "search_matches",
                                "arguments": "{\"query\":\"Inter\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = MistralProvider::new(config_for(&mock_server))?;
        let tool = Tool::new(
            "search_matches",
            "Find matches by team name",
            vec![ToolParameter::required("query", ParamKind::String, "Team name")],
        );

        let turn = provider
            .complete(
                &[Message::system("coach"), Message::user("Inter?")],
                &[tool],
                &CompletionOptions::new(0.2, 400),
            )
            .await?;

        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].id, "call_123");
        assert_eq!(turn.tool_calls[0].arguments, r#"{"query":"Inter"}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_status_carries_code_and_body() {
        let (_server, provider) = setup_mock_server(
            ResponseTemplate::new(429).set_body_string("{\"message\":\"rate limited\"}"),
        )
        .await;

        let err = provider
            .complete(&[Message::user("hi")], &[], &CompletionOptions::default())
            .await
            .unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_distinguishable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let mut config = config_for(&mock_server);
        config.timeout = Duration::from_millis(50);
        let provider = MistralProvider::new(config).unwrap();

        let err = provider
            .complete(&[Message::user("hi")], &[], &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout));
    }
}
