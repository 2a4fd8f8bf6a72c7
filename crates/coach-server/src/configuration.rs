use crate::error::{to_env_var, ConfigError};
use coach::providers::configs::{
    MistralProviderConfig, DEFAULT_TIMEOUT, MISTRAL_HOST, MISTRAL_MODEL,
};
use coach::tools::web_search::{WebSearchConfig, SEARCH_HOST};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Keys without a default, checked before deserializing so the error names the variable to set
const REQUIRED_KEYS: &[&str] = &["provider.api_key", "store.path"];

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn into_config(self) -> MistralProviderConfig {
        MistralProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            host: default_search_host(),
            api_key: None,
            max_results: default_max_results(),
        }
    }
}

impl SearchSettings {
    pub fn into_config(self) -> WebSearchConfig {
        WebSearchConfig {
            host: self.host,
            // An empty key counts as no key
            api_key: self.api_key.filter(|key| !key.trim().is_empty()),
            max_results: self.max_results,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    /// JSON snapshot of the match collections
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub search: SearchSettings,
    pub store: StoreSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("provider.host", default_provider_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            .add_source(
                Environment::with_prefix("COACH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        for key in REQUIRED_KEYS {
            if config.get_string(key).is_err() {
                return Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var(key),
                });
            }
        }

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            match &err {
                config::ConfigError::NotFound(key) => ConfigError::MissingEnvVar {
                    env_var: to_env_var(key),
                },
                _ => ConfigError::Other(err),
            }
        })
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_provider_host() -> String {
    MISTRAL_HOST.to_string()
}

fn default_model() -> String {
    MISTRAL_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_search_host() -> String {
    SEARCH_HOST.to_string()
}

fn default_max_results() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("COACH_") {
                env::remove_var(&key);
            }
        }
    }

    fn set_required() {
        env::set_var("COACH_PROVIDER__API_KEY", "test-key");
        env::set_var("COACH_STORE__PATH", "/tmp/store.json");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clean_env();
        set_required();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.provider.host, MISTRAL_HOST);
        assert_eq!(settings.provider.model, MISTRAL_MODEL);
        assert_eq!(settings.provider.timeout_secs, 25);
        assert_eq!(settings.provider.temperature, None);
        assert_eq!(settings.search.api_key, None);
        assert_eq!(settings.search.max_results, 5);
        assert_eq!(settings.store.path, PathBuf::from("/tmp/store.json"));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        set_required();
        env::set_var("COACH_SERVER__PORT", "8080");
        env::set_var("COACH_PROVIDER__MODEL", "mistral-large-latest");
        env::set_var("COACH_PROVIDER__TEMPERATURE", "0.4");
        env::set_var("COACH_PROVIDER__MAX_TOKENS", "1200");
        env::set_var("COACH_PROVIDER__TIMEOUT_SECS", "10");
        env::set_var("COACH_SEARCH__API_KEY", "search-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.provider.temperature, Some(0.4));

        let provider = settings.provider.into_config();
        assert_eq!(provider.model, "mistral-large-latest");
        assert_eq!(provider.max_tokens, Some(1200));
        assert_eq!(provider.timeout, Duration::from_secs(10));

        let search = settings.search.into_config();
        assert_eq!(search.api_key.as_deref(), Some("search-key"));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();
        env::set_var("COACH_STORE__PATH", "/tmp/store.json");

        let err = Settings::new().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEnvVar { ref env_var } if env_var == "COACH_PROVIDER__API_KEY"
        ));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_store_path() {
        clean_env();
        env::set_var("COACH_PROVIDER__API_KEY", "test-key");

        let err = Settings::new().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: COACH_STORE__PATH"
        );

        clean_env();
    }

    #[test]
    fn test_blank_search_key_is_unset() {
        let search = SearchSettings {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(search.into_config().api_key.is_none());
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        assert_eq!(
            server_settings.socket_addr().unwrap().to_string(),
            "127.0.0.1:3000"
        );
    }
}
