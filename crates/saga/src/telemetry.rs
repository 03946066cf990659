//! # Telemetry Module
//!
//! Tracing bootstrap for the provisioning engine. Call [`init_telemetry`]
//! once at application startup and keep the returned guard alive.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Configuration for telemetry initialization
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on every event
    pub service_name: String,
    /// Default log level filter, overridable via `RUST_LOG`
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "portico-provisioning".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Telemetry guard - must be kept alive for tracing to work
pub struct TelemetryGuard;

/// Initializes the global tracing subscriber.
///
/// Safe to call more than once: a subscriber already installed (e.g. by a
/// test harness) wins and the call becomes a no-op.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let _ = Registry::default()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .try_init();

    tracing::info!(service = %config.service_name, "telemetry initialized");
    TelemetryGuard
}
