//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::Config;

/// Installs the global tracing subscriber.
///
/// The filter comes from `config.log_level` (falling back to `info` if it
/// does not parse). Lines are plain text, or JSON when `config.json_logs` is
/// set. Safe to call more than once: if a global subscriber is already
/// installed it is left in place and `false` is returned.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.json_logs.then(|| fmt::layer().json());
    let plain = (!config.json_logs).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init()
        .is_ok()
}
