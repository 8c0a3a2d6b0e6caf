//! Structured logging setup.
//!
//! The simulation logs through `tracing` macros:
//! - `info!` for spawns
//! - `debug!` for deaths, staggers, leashing, returning home and lock-on
//! - `warn!` once per boss when no target can be found
//!
//! Nothing is printed until a subscriber is installed. Hosts that already
//! install one can skip [`init_tracing`] entirely.

use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level for a filter directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Per-strike detail.
    Trace,
    /// State transitions.
    Debug,
    /// Spawns and lifecycle.
    Info,
    /// Degraded behaviour.
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Directive spelling of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Configuration for [`init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Level for targets without a module filter.
    pub default_level: LogLevel,
    /// Per-target overrides, e.g. `("ashen_core::controller", Debug)`.
    pub module_filters: Vec<(String, LogLevel)>,
    /// Print the event target.
    pub show_targets: bool,
    /// Print thread ids.
    pub show_thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("ashen_core::simulation".to_string(), LogLevel::Info),
                ("ashen_core::controller".to_string(), LogLevel::Info),
                ("ashen_core::resolver".to_string(), LogLevel::Warn),
            ],
            show_targets: true,
            show_thread_ids: false,
        }
    }
}

impl TracingConfig {
    /// Renders the config as an `EnvFilter` directive string.
    #[must_use]
    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{module}={}", level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs a global fmt subscriber. The first call wins.
///
/// `RUST_LOG` takes precedence over the configured filter. If another
/// subscriber is already installed this does nothing.
pub fn init_tracing(config: &TracingConfig) {
    let filter_str = config.to_env_filter_string();
    let show_targets = config.show_targets;
    let show_thread_ids = config.show_thread_ids;
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(show_targets)
            .with_thread_ids(show_thread_ids)
            .compact();

        let _ = subscriber.try_init();
    });
}

/// Installs the default subscriber. Safe to call repeatedly.
pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_filter_string_lists_overrides() {
        let filter = TracingConfig::default().to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("ashen_core::resolver=warn"));
    }

    #[test]
    fn custom_filters() {
        let config = TracingConfig {
            default_level: LogLevel::Debug,
            module_filters: vec![("ashen_core::controller::boss".to_string(), LogLevel::Trace)],
            ..TracingConfig::default()
        };
        assert_eq!(
            config.to_env_filter_string(),
            "debug,ashen_core::controller::boss=trace"
        );
    }

    #[test]
    fn config_deserialises_with_defaults() {
        let config: TracingConfig =
            serde_json::from_str(r#"{ "default_level": "Warn" }"#).unwrap_or_default();
        assert_eq!(config.default_level, LogLevel::Warn);
        assert!(config.show_targets);
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing_default();
        init_tracing_default();
        init_tracing(&TracingConfig {
            default_level: LogLevel::Trace,
            ..TracingConfig::default()
        });
    }
}
