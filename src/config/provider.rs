// Provider kinds and per-provider configuration
//
// One ProviderConfig per live backend, built once at startup from a credential
// and the defaults below (optionally overridden by the config file).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of vendor integration strategies.
///
/// Declaration order is the preference order used to pick the default provider
/// (cheapest / most available first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Gemini through Google's OpenAI-compatible endpoint
    Gemini,
    /// Claude through Anthropic's native messages API
    Anthropic,
    /// OpenAI chat completions
    Openai,
}

impl ProviderKind {
    /// All kinds in preference order.
    pub const PREFERENCE: [ProviderKind; 3] =
        [ProviderKind::Gemini, ProviderKind::Anthropic, ProviderKind::Openai];

    /// Short tag used in config files, CLI flags and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::Openai => "openai",
        }
    }

    /// Human-readable name for UI display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini (OpenAI-compatible)",
            Self::Anthropic => "Anthropic Claude",
            Self::Openai => "OpenAI",
        }
    }

    /// Environment variables probed for this provider's credential, in order.
    pub fn credential_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Self::Anthropic => &["ANTHROPIC_API_KEY"],
            Self::Openai => &["OPENAI_API_KEY"],
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Openai => "https://api.openai.com/v1",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::Anthropic => "claude-3-haiku-20240307",
            Self::Openai => "gpt-4o-mini",
        }
    }

    /// (input, output) USD per 1000 tokens.
    fn default_costs(&self) -> (f64, f64) {
        match self {
            Self::Gemini => (0.0001, 0.0007),
            Self::Anthropic => (0.00025, 0.00125),
            Self::Openai => (0.00015, 0.0006),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "gemini_openai" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "gpt" => Ok(Self::Openai),
            other => Err(format!(
                "Unknown provider '{}'. Expected one of: gemini, anthropic, openai",
                other
            )),
        }
    }
}

/// Optional per-provider overrides read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Configuration for one live provider backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Base URL without trailing slash
    pub endpoint: String,
    pub model: String,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl ProviderConfig {
    /// Build a config for `kind` with the built-in endpoint, model and pricing.
    pub fn with_defaults(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        let (input_cost_per_1k, output_cost_per_1k) = kind.default_costs();
        Self {
            kind,
            api_key: api_key.into(),
            endpoint: kind.default_endpoint().to_string(),
            model: kind.default_model().to_string(),
            input_cost_per_1k,
            output_cost_per_1k,
        }
    }

    /// Apply config-file overrides (model and/or endpoint).
    pub fn apply_override(mut self, overrides: &ProviderOverride) -> Self {
        if let Some(model) = &overrides.model {
            self.model = model.clone();
        }
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Estimated USD cost for the given token counts.
    pub fn estimate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (f64::from(input_tokens) / 1000.0) * self.input_cost_per_1k
            + (f64::from(output_tokens) / 1000.0) * self.output_cost_per_1k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_order() {
        assert_eq!(
            ProviderKind::PREFERENCE,
            [ProviderKind::Gemini, ProviderKind::Anthropic, ProviderKind::Openai]
        );
    }

    #[test]
    fn test_kind_from_str_accepts_aliases() {
        assert_eq!("gemini_openai".parse::<ProviderKind>(), Ok(ProviderKind::Gemini));
        assert_eq!("Claude".parse::<ProviderKind>(), Ok(ProviderKind::Anthropic));
        assert_eq!(" openai ".parse::<ProviderKind>(), Ok(ProviderKind::Openai));
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_kind_serde_tag() {
        let json = serde_json::to_string(&ProviderKind::Anthropic).unwrap();
        assert_eq!(json, "\"anthropic\"");
        let kind: ProviderKind = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(kind, ProviderKind::Gemini);
    }

    #[test]
    fn test_defaults_per_kind() {
        let gemini = ProviderConfig::with_defaults(ProviderKind::Gemini, "key");
        assert_eq!(gemini.model, "gemini-1.5-flash");
        assert!(gemini.endpoint.ends_with("/openai"));

        let claude = ProviderConfig::with_defaults(ProviderKind::Anthropic, "key");
        assert_eq!(claude.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_override_trims_endpoint_slash() {
        let config = ProviderConfig::with_defaults(ProviderKind::Openai, "key").apply_override(
            &ProviderOverride {
                model: Some("gpt-4o".to_string()),
                endpoint: Some("http://localhost:9000/v1/".to_string()),
            },
        );
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.endpoint, "http://localhost:9000/v1");
    }

    #[test]
    fn test_estimate_cost() {
        let config = ProviderConfig::with_defaults(ProviderKind::Openai, "key");
        // 800 in @ 0.00015 + 600 out @ 0.0006
        let cost = config.estimate_cost(800, 600);
        assert!((cost - (0.00012 + 0.00036)).abs() < 1e-12);
        assert_eq!(config.estimate_cost(0, 0), 0.0);
    }
}
