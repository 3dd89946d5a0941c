// Provider registry
//
// Decided once at startup from the available credentials. Holds one
// ProviderConfig per live provider kind and never touches the network.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::constants::{ESTIMATED_INPUT_TOKENS_PER_CARD, ESTIMATED_OUTPUT_TOKENS_PER_CARD};
use crate::config::{Credentials, ProviderConfig, ProviderKind, ProviderOverrides};
use crate::errors::{Error, Result};

/// Estimated spend for a number of cards on one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub provider: ProviderKind,
    pub model: String,
    pub per_card: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    // BTreeMap iteration follows ProviderKind's declaration (preference) order
    configs: BTreeMap<ProviderKind, ProviderConfig>,
}

impl ProviderRegistry {
    /// Build from probed credentials plus config-file overrides.
    pub fn from_credentials(credentials: &Credentials, overrides: &ProviderOverrides) -> Self {
        let configs = credentials
            .kinds()
            .into_iter()
            .filter_map(|kind| {
                credentials.get(kind).map(|key| {
                    ProviderConfig::with_defaults(kind, key).apply_override(overrides.for_kind(kind))
                })
            })
            .collect::<Vec<_>>();
        Self::from_configs(configs)
    }

    /// Probe the process environment with no overrides.
    pub fn from_env() -> Self {
        Self::from_credentials(&Credentials::from_env(), &ProviderOverrides::default())
    }

    /// Build from fully specified configs (later duplicates of a kind replace earlier ones).
    pub fn from_configs(configs: impl IntoIterator<Item = ProviderConfig>) -> Self {
        let configs: BTreeMap<_, _> = configs.into_iter().map(|c| (c.kind, c)).collect();

        if configs.is_empty() {
            tracing::warn!("No LLM providers configured; generation is disabled");
        } else {
            tracing::info!(
                "Live providers: {}",
                configs
                    .keys()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Self { configs }
    }

    /// Live provider kinds in preference order.
    pub fn list_available(&self) -> Vec<ProviderKind> {
        self.configs.keys().copied().collect()
    }

    /// First live provider in preference order.
    pub fn default_provider(&self) -> Option<ProviderKind> {
        self.configs.keys().next().copied()
    }

    pub fn is_degraded(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn is_available(&self, kind: ProviderKind) -> bool {
        self.configs.contains_key(&kind)
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.configs.get(&kind)
    }

    pub fn configs(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.configs.values()
    }

    /// Pick the provider for a call.
    ///
    /// An explicit request for a provider that is not live falls back to the
    /// default with a warning. Fails only when no provider is live.
    pub fn resolve(&self, requested: Option<ProviderKind>) -> Result<ProviderKind> {
        let default = self.default_provider().ok_or_else(Error::no_providers)?;
        match requested {
            None => Ok(default),
            Some(kind) if self.is_available(kind) => Ok(kind),
            Some(kind) => {
                tracing::warn!(
                    "Provider {} is not configured; using default provider {}",
                    kind,
                    default
                );
                Ok(default)
            }
        }
    }

    /// Estimated cost of `card_count` cards on every live provider.
    pub fn cost_comparison(&self, card_count: u32) -> Vec<CostEstimate> {
        self.configs
            .values()
            .map(|config| {
                let per_card = config
                    .estimate_cost(ESTIMATED_INPUT_TOKENS_PER_CARD, ESTIMATED_OUTPUT_TOKENS_PER_CARD);
                CostEstimate {
                    provider: config.kind,
                    model: config.model.clone(),
                    per_card,
                    total: per_card * f64::from(card_count),
                }
            })
            .collect()
    }

    /// Live provider with the lowest per-card estimate.
    pub fn cheapest(&self) -> Option<ProviderKind> {
        self.cost_comparison(1)
            .into_iter()
            .min_by(|a, b| a.per_card.total_cmp(&b.per_card))
            .map(|estimate| estimate.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(keys: &[(ProviderKind, &str)]) -> ProviderRegistry {
        let credentials = keys
            .iter()
            .fold(Credentials::default(), |c, (kind, key)| c.with_key(*kind, *key));
        ProviderRegistry::from_credentials(&credentials, &ProviderOverrides::default())
    }

    // ─── availability ──────────────────────────────────────────

    #[test]
    fn test_every_credential_subset() {
        let kinds = ProviderKind::PREFERENCE;
        for mask in 0u8..8 {
            let present: Vec<ProviderKind> = kinds
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, k)| *k)
                .collect();
            let keys: Vec<(ProviderKind, &str)> = present.iter().map(|k| (*k, "real-key")).collect();

            let registry = registry(&keys);
            assert_eq!(registry.list_available(), present);
            assert_eq!(registry.default_provider(), present.first().copied());
            assert_eq!(registry.is_degraded(), present.is_empty());
        }
    }

    #[test]
    fn test_placeholder_only_is_degraded() {
        let credentials = Credentials::from_lookup(|name| {
            (name == "ANTHROPIC_API_KEY").then(|| "your-anthropic-api-key-here".to_string())
        });
        let registry = ProviderRegistry::from_credentials(&credentials, &ProviderOverrides::default());
        assert!(registry.list_available().is_empty());
        assert!(registry.resolve(None).unwrap_err().is_configuration());
    }

    #[test]
    fn test_overrides_applied() {
        let credentials = Credentials::default().with_key(ProviderKind::Openai, "sk");
        let mut overrides = ProviderOverrides::default();
        overrides.openai.model = Some("gpt-4o".to_string());
        let registry = ProviderRegistry::from_credentials(&credentials, &overrides);
        assert_eq!(registry.get(ProviderKind::Openai).map(|c| c.model.as_str()), Some("gpt-4o"));
    }

    // ─── resolution ────────────────────────────────────────────

    #[test]
    fn test_resolve_explicit_live_provider() {
        let registry = registry(&[(ProviderKind::Gemini, "g"), (ProviderKind::Openai, "o")]);
        assert_eq!(registry.resolve(Some(ProviderKind::Openai)).unwrap(), ProviderKind::Openai);
    }

    #[test]
    fn test_resolve_substitutes_default_for_dead_provider() {
        let registry = registry(&[(ProviderKind::Anthropic, "a")]);
        assert_eq!(registry.resolve(Some(ProviderKind::Gemini)).unwrap(), ProviderKind::Anthropic);
        assert_eq!(registry.resolve(None).unwrap(), ProviderKind::Anthropic);
    }

    // ─── costs ─────────────────────────────────────────────────

    #[test]
    fn test_cost_comparison_scales_with_cards() {
        let registry = registry(&[(ProviderKind::Openai, "o")]);
        let one = registry.cost_comparison(1);
        let ten = registry.cost_comparison(10);
        assert_eq!(one.len(), 1);
        assert!((ten[0].total - one[0].per_card * 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_cheapest_provider() {
        let registry = registry(&[
            (ProviderKind::Gemini, "g"),
            (ProviderKind::Anthropic, "a"),
            (ProviderKind::Openai, "o"),
        ]);
        // gemini: 0.8*0.0001 + 0.6*0.0007 = 0.0005
        // openai: 0.8*0.00015 + 0.6*0.0006 = 0.00048
        assert_eq!(registry.cheapest(), Some(ProviderKind::Openai));
        assert_eq!(ProviderRegistry::default().cheapest(), None);
    }
}
