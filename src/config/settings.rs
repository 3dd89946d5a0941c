// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::constants::{
    CONFIG_DIR_NAME, DEFAULT_LANGUAGE, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS,
};
use super::provider::{ProviderKind, ProviderOverride};

/// Per-provider overrides, one optional table per kind:
///
/// ```toml
/// [providers.openai]
/// model = "gpt-4o"
/// endpoint = "https://proxy.internal/v1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderOverrides {
    #[serde(default)]
    pub gemini: ProviderOverride,
    #[serde(default)]
    pub anthropic: ProviderOverride,
    #[serde(default)]
    pub openai: ProviderOverride,
}

impl ProviderOverrides {
    pub fn for_kind(&self, kind: ProviderKind) -> &ProviderOverride {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Openai => &self.openai,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME).join("data"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for creators.json / content_sets.json / cards.json and usage logs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Per-call provider timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Language the cards are written in (BCP 47 tag)
    #[serde(default = "default_language")]
    pub language: String,

    /// Append every completion's token usage to `<data_dir>/usage/*.jsonl`
    #[serde(default = "default_true")]
    pub usage_log: bool,

    #[serde(default)]
    pub providers: ProviderOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            request_timeout_secs: default_timeout(),
            language: default_language(),
            usage_log: true,
            providers: ProviderOverrides::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn usage_dir(&self) -> PathBuf {
        self.data_dir.join("usage")
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            bail!(
                "request_timeout_secs must be between 1 and {} (got {})",
                MAX_REQUEST_TIMEOUT_SECS,
                self.request_timeout_secs
            );
        }
        if self.language.trim().is_empty() {
            bail!("language must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.language, "pt-BR");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            request_timeout_secs = 45

            [providers.anthropic]
            model = "claude-3-5-haiku-latest"
            "#,
        )
        .unwrap();
        assert_eq!(config.request_timeout_secs, 45);
        assert_eq!(config.language, "pt-BR");
        assert!(config.usage_log);
        assert_eq!(
            config.providers.for_kind(ProviderKind::Anthropic).model.as_deref(),
            Some("claude-3-5-haiku-latest")
        );
        assert!(config.providers.for_kind(ProviderKind::Gemini).model.is_none());
    }
}
