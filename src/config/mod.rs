//! Engine Configuration Module
//!
//! ## Loading Order
//!
//! 1. `PDM_CONFIG` environment variable (path to TOML file)
//! 2. `pdm_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Environment overrides (`PDM_SERVER_ADDR`, `TELEMETRY_SERVICE_URL`,
//! `ML_SERVICE_URL`, `PDM_UPSTREAM_TIMEOUT_MS`) are applied on top.
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere in the codebase:
//! let timeout = config::get().upstream.timeout();
//! ```

mod engine_config;
pub mod defaults;

pub use engine_config::*;

use std::sync::OnceLock;

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// A second call is ignored with a warning.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global engine configuration, falling back to defaults when
/// `init()` has not run (tests, embedded use).
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}
