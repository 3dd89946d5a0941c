// Configuration module
// Public interface for configuration loading

pub mod constants;
mod credentials;
mod loader;
mod provider;
mod settings;

pub use credentials::{is_placeholder, Credentials};
pub use loader::{default_config_path, load, load_config, load_config_from, DATA_DIR_ENV};
pub use provider::{ProviderConfig, ProviderKind, ProviderOverride};
pub use settings::{Config, ProviderOverrides};
