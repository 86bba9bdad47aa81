use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Application settings, layered from an optional `themis.toml` and
/// `THEMIS_*` environment variables, with CLI overrides applied last.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub limits: LimitSettings,
    pub rate_limit: Option<RateLimitConfig>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("themis.toml")
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("THEMIS").separator("__"))
            .build()?;
        settings.try_deserialize()
    }

    /// Apply command-line overrides on top of file/env configuration.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Generation-capability settings. The provider speaks the OpenAI
/// chat-completions wire format; `base_url` points it at compatible
/// gateways.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key_env: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: None,
            max_tokens: Some(2048),
        }
    }
}

/// Request-validation and turn limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Max characters in an incoming message (and each history entry)
    pub max_message_chars: usize,
    /// Max history entries accepted per request
    pub max_history_messages: usize,
    /// Max model-call rounds per turn
    pub max_rounds: u32,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_message_chars: 8000,
            max_history_messages: 20,
            max_rounds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}
