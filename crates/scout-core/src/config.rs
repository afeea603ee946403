use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime settings loaded from `scout.toml`.
///
/// Credentials are never stored here; the assistant section only names the
/// environment variable that holds the API key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl RuntimeSettings {
    /// Load from a specific path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: RuntimeSettings =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "client.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.assistant.max_tool_rounds == 0 {
            return Err(ConfigError::Validation(
                "assistant.max_tool_rounds must be greater than zero".into(),
            ));
        }
        if self.assistant.model.trim().is_empty() {
            return Err(ConfigError::Validation("assistant.model must not be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Upper bound for one request against the remote backend.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delay mock responses so loading states stay visible.
    #[serde(default = "default_true")]
    pub simulate_latency: bool,
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            simulate_latency: true,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model_base_url")]
    pub api_base_url: String,
    /// Name of the environment variable holding the model API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_model_base_url(),
            api_key_env: default_api_key_env(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-lite".into()
}
fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_api_key_env() -> String {
    "API_KEY".into()
}
fn default_max_tool_rounds() -> u32 {
    16
}
