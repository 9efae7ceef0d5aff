//! Service configuration loaded from environment variables.

/// Default address for out-of-stock alerts.
pub const DEFAULT_STOCK_ALERT_DESTINATION: &str = "stock@made.com";

/// Default number of attempts for a handler that loses a concurrency race.
pub const DEFAULT_MAX_COMMAND_ATTEMPTS: usize = 3;

/// Service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `ALLOCATION_STOCK_ALERT_DESTINATION`: out-of-stock alert address
///   (default: `"stock@made.com"`)
/// - `ALLOCATION_MAX_COMMAND_ATTEMPTS`: attempts per handler on conflicts
///   (default: `3`, minimum `1`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `ALLOCATION_LOG_JSON`: `true` or `1` for JSON log lines (default: off)
/// - `DATABASE_URL`: PostgreSQL connection string (optional)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub stock_alert_destination: String,
    pub max_command_attempts: usize,
    pub log_level: String,
    pub json_logs: bool,
    pub database_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            stock_alert_destination: lookup("ALLOCATION_STOCK_ALERT_DESTINATION")
                .unwrap_or(defaults.stock_alert_destination),
            max_command_attempts: lookup("ALLOCATION_MAX_COMMAND_ATTEMPTS")
                .and_then(|v| v.parse::<usize>().ok())
                .map(|n| n.max(1))
                .unwrap_or(defaults.max_command_attempts),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            json_logs: lookup("ALLOCATION_LOG_JSON")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(defaults.json_logs),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stock_alert_destination: DEFAULT_STOCK_ALERT_DESTINATION.to_string(),
            max_command_attempts: DEFAULT_MAX_COMMAND_ATTEMPTS,
            log_level: "info".to_string(),
            json_logs: false,
            database_url: None,
        }
    }
}
