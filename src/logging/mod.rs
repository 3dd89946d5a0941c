// Logging
//
// Process-wide tracing setup plus the JSONL usage ledger that records token
// spend per completion.

pub mod usage_log;

pub use usage_log::{UsageEntry, UsageLogger, UsageSummary};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber (stderr, so stdout stays clean for command output).
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for this crate when
/// `verbose` is true. Safe to call more than once (later calls are no-ops).
pub fn init(verbose: bool) {
    let fallback = if verbose { "info,infogen=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
