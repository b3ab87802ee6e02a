//! TaskBoard configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured model
pub const MODEL_ENV: &str = "TASKBOARD_MODEL";

/// Main TaskBoard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Completion endpoint configuration
    pub llm: LlmConfig,

    /// Task persistence configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .taskboard.yml
        let local_config = PathBuf::from(".taskboard.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/taskboard/taskboard.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("taskboard").join("taskboard.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL (without `/chat/completions`)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the bearer token
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "qwen-2.5-32b".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// Resolve token and model from the process environment
    pub fn resolve(&self) -> Result<ResolvedLlmConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedLlmConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::debug!(api_key_env = %self.api_key_env, "LlmConfig::resolve_with: called");
        let api_key = lookup(&self.api_key_env)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| eyre::eyre!("LLM API key not found. Set the {} environment variable.", self.api_key_env))?;

        let model = lookup(MODEL_ENV)
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.model.clone());

        Ok(ResolvedLlmConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// Fully resolved endpoint settings, ready to build a client
#[derive(Clone)]
pub struct ResolvedLlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl std::fmt::Debug for ResolvedLlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedLlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Task persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding tasks.json
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/taskboard on Linux)
        let data_dir = dirs::data_dir()
            .map(|d| d.join("taskboard"))
            .unwrap_or_else(|| PathBuf::from(".taskboard"))
            .to_string_lossy()
            .into_owned();

        Self { data_dir }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_dir_path(&self) -> PathBuf {
        if let Some(rest) = self.data_dir.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "qwen-2.5-32b");
        assert_eq!(config.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.timeout_ms, 60_000);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: DEBUG
llm:
  base-url: https://api.example.com/v1/
  model: llama-3
  api-key-env: MY_API_KEY
  timeout-ms: 5000
storage:
  data-dir: /tmp/tb
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.llm.model, "llama-3");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.timeout_ms, 5000);
        assert_eq!(config.storage.data_dir_path(), PathBuf::from("/tmp/tb"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: llama-3
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "llama-3");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_resolve_requires_token() {
        let config = LlmConfig::default();
        let err = config.resolve_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));

        assert!(config.resolve_with(env(&[("GROQ_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_resolve_model_override() {
        let config = LlmConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            ..LlmConfig::default()
        };

        let resolved = config.resolve_with(env(&[("GROQ_API_KEY", "secret")])).unwrap();
        assert_eq!(resolved.model, "qwen-2.5-32b");
        assert_eq!(resolved.api_key, "secret");
        assert_eq!(resolved.base_url, "https://api.example.com/v1");

        let resolved = config
            .resolve_with(env(&[("GROQ_API_KEY", "secret"), (MODEL_ENV, "llama-3")]))
            .unwrap();
        assert_eq!(resolved.model, "llama-3");
        assert!(!format!("{:?}", resolved).contains("secret"));
    }
}
