// Credential source
//
// Provider API keys come from the process environment, one or more variables
// per provider kind. Template values shipped in example .env files count as absent.

use std::collections::BTreeMap;

use super::provider::ProviderKind;

/// True for values that are obviously not real keys.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("your-") || value.ends_with("-here")
}

/// Usable API keys keyed by provider kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    keys: BTreeMap<ProviderKind, String>,
}

impl Credentials {
    /// Probe the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Probe an arbitrary variable lookup (first usable variable per kind wins).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut keys = BTreeMap::new();
        for kind in ProviderKind::PREFERENCE {
            let found = kind
                .credential_vars()
                .iter()
                .filter_map(|var| lookup(var))
                .find(|value| !is_placeholder(value));
            match found {
                Some(key) => {
                    keys.insert(kind, key.trim().to_string());
                }
                None => tracing::debug!("No usable credential for {}", kind),
            }
        }
        Self { keys }
    }

    /// Add a key directly; placeholders are ignored.
    pub fn with_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        let key = key.into();
        if !is_placeholder(&key) {
            self.keys.insert(kind, key.trim().to_string());
        }
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        self.keys.get(&kind).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Kinds with a usable key, in preference order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.keys.keys().copied().collect()
    }
}
