//! Configuration management for Chatpad
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatpadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Chatpad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Inference endpoint settings
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Session storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat input settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Remote text-generation endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// URL the prompt is POSTed to
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Optional API token, sent as a bearer token when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Generation parameters sent with every request
    #[serde(default)]
    pub parameters: GenerationParameters,
}

fn default_api_url() -> String {
    "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            parameters: GenerationParameters::default(),
        }
    }
}

impl InferenceConfig {
    /// The API key, if one is configured and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Sampling parameters sent in the request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Maximum output length
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus-sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Whether the endpoint should echo the prompt in its output
    #[serde(default)]
    pub return_full_text: bool,
}

fn default_max_length() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            return_full_text: false,
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; the platform data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Key the session list is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    crate::storage::SESSIONS_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
        }
    }
}

/// Chat input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Longest accepted user message, in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

fn default_max_message_length() -> usize {
    500
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: default_max_message_length(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatpadError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatpadError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_url) = std::env::var("CHATPAD_API_URL") {
            self.inference.api_url = api_url;
        }

        if let Ok(api_key) = std::env::var("CHATPAD_API_KEY") {
            self.inference.api_key = Some(api_key);
        } else if let Ok(api_key) = std::env::var("HF_API_TOKEN") {
            self.inference.api_key = Some(api_key);
        }

        if let Ok(timeout) = std::env::var("CHATPAD_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.inference.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CHATPAD_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(path) = std::env::var("CHATPAD_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(api_url) = &cli.api_url {
            self.inference.api_url = api_url.clone();
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = self.inference.api_url.trim();
        if url.is_empty() {
            return Err(ChatpadError::Config("inference.api_url cannot be empty".to_string()).into());
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ChatpadError::Config(format!(
                "inference.api_url must be an http(s) URL: {}",
                url
            ))
            .into());
        }

        if self.inference.timeout_seconds == 0 {
            return Err(ChatpadError::Config(
                "inference.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let params = &self.inference.parameters;
        if params.max_length == 0 {
            return Err(ChatpadError::Config(
                "inference.parameters.max_length must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&params.temperature) {
            return Err(ChatpadError::Config(
                "inference.parameters.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if params.top_p <= 0.0 || params.top_p > 1.0 {
            return Err(ChatpadError::Config(
                "inference.parameters.top_p must be in (0.0, 1.0]".to_string(),
            )
            .into());
        }

        if self.storage.key.is_empty() {
            return Err(ChatpadError::Config("storage.key cannot be empty".to_string()).into());
        }

        if self.chat.max_message_length == 0 {
            return Err(ChatpadError::Config(
                "chat.max_message_length must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cli_without_overrides() -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            storage_path: None,
            api_url: None,
            command: crate::cli::Commands::Sessions {
                command: crate::cli::SessionCommand::List,
            },
        }
    }

    fn clear_env() {
        for var in [
            "CHATPAD_API_URL",
            "CHATPAD_API_KEY",
            "HF_API_TOKEN",
            "CHATPAD_TIMEOUT_SECONDS",
            "CHATPAD_STORAGE_PATH",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.inference.api_url.contains("DialoGPT-medium"));
        assert_eq!(config.inference.timeout_seconds, 30);
        assert_eq!(config.inference.parameters.max_length, 200);
        assert_eq!(config.inference.parameters.temperature, 0.7);
        assert_eq!(config.inference.parameters.top_p, 0.9);
        assert!(!config.inference.parameters.return_full_text);
        assert_eq!(config.storage.key, "chatSessions");
        assert_eq!(config.chat.max_message_length, 500);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_url() {
        let mut config = Config::default();
        config.inference.api_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_non_http_url() {
        let mut config = Config::default();
        config.inference.api_url = "ftp://example.com/model".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.inference.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_sampling_ranges() {
        let mut config = Config::default();
        config.inference.parameters.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.inference.parameters.top_p = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.inference.parameters.max_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_storage_key() {
        let mut config = Config::default();
        config.storage.key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
inference:
  api_url: https://example.com/models/blenderbot
  api_key: hf_test
  timeout_seconds: 10
  parameters:
    max_length: 64
    temperature: 0.2
storage:
  path: /tmp/chatpad-test
chat:
  max_message_length: 120
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.inference.api_url, "https://example.com/models/blenderbot");
        assert_eq!(config.inference.api_key(), Some("hf_test"));
        assert_eq!(config.inference.timeout_seconds, 10);
        assert_eq!(config.inference.parameters.max_length, 64);
        assert_eq!(config.inference.parameters.top_p, 0.9);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/chatpad-test")));
        assert_eq!(config.storage.key, "chatSessions");
        assert_eq!(config.chat.max_message_length, 120);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let mut config = InferenceConfig::default();
        config.api_key = Some("   ".to_string());
        assert_eq!(config.api_key(), None);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &cli_without_overrides()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_is_config_error() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "inference: [unclosed").unwrap();

        let err = Config::load(path.to_str().unwrap(), &cli_without_overrides()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_vars_override_file_values() {
        clear_env();
        std::env::set_var("CHATPAD_API_URL", "http://localhost:9999/generate");
        std::env::set_var("HF_API_TOKEN", "hf_env");
        std::env::set_var("CHATPAD_TIMEOUT_SECONDS", "5");
        std::env::set_var("CHATPAD_STORAGE_PATH", "/tmp/chatpad-env");

        let config = Config::load("nonexistent.yaml", &cli_without_overrides()).unwrap();
        clear_env();

        assert_eq!(config.inference.api_url, "http://localhost:9999/generate");
        assert_eq!(config.inference.api_key(), Some("hf_env"));
        assert_eq!(config.inference.timeout_seconds, 5);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/chatpad-env")));
    }

    #[test]
    #[serial]
    fn test_chatpad_api_key_takes_precedence() {
        clear_env();
        std::env::set_var("CHATPAD_API_KEY", "primary");
        std::env::set_var("HF_API_TOKEN", "secondary");

        let config = Config::load("nonexistent.yaml", &cli_without_overrides()).unwrap();
        clear_env();

        assert_eq!(config.inference.api_key(), Some("primary"));
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env_is_ignored() {
        clear_env();
        std::env::set_var("CHATPAD_TIMEOUT_SECONDS", "soon");

        let config = Config::load("nonexistent.yaml", &cli_without_overrides()).unwrap();
        clear_env();

        assert_eq!(config.inference.timeout_seconds, 30);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win_over_env() {
        clear_env();
        std::env::set_var("CHATPAD_STORAGE_PATH", "/tmp/from-env");

        let mut cli = cli_without_overrides();
        cli.storage_path = Some("/tmp/from-cli".to_string());
        cli.api_url = Some("http://127.0.0.1:8080/model".to_string());

        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/from-cli")));
        assert_eq!(config.inference.api_url, "http://127.0.0.1:8080/model");
    }
}
