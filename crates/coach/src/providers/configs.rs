use std::time::Duration;

pub const MISTRAL_HOST: &str = "https://api.mistral.ai";
pub const MISTRAL_MODEL: &str = "mistral-small-latest";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Clone)]
pub struct MistralProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub timeout: Duration,
}

impl MistralProviderConfig {
    pub fn new<K: Into<String>>(api_key: K) -> Self {
        Self {
            host: MISTRAL_HOST.to_string(),
            api_key: api_key.into(),
            model: MISTRAL_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
