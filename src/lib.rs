// infogen - multi-provider LLM content card generation
// Library exports

pub mod cli;
pub mod config;
pub mod content;
pub mod errors;
pub mod generation;
pub mod logging;
pub mod providers;
pub mod service;
pub mod storage;

pub use errors::{Error, Result, ValidationError};
pub use service::ContentService;
