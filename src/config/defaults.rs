//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery. Scoring and synthesis constants
//! live next to their models in `scoring` and `telemetry`.

// ============================================================================
// Server
// ============================================================================

/// Listen address when neither config nor `PDM_SERVER_ADDR` sets one.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// Maximum accepted request body (bytes).
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

// ============================================================================
// Upstream services
// ============================================================================

/// Per-stage timeout for remote telemetry and scoring calls (milliseconds).
pub const UPSTREAM_TIMEOUT_MS: u64 = 5_000;

/// Connect timeout for the upstream HTTP client (milliseconds).
pub const UPSTREAM_CONNECT_TIMEOUT_MS: u64 = 2_000;

// ============================================================================
// Model
// ============================================================================

/// Version stamped onto ledger records that do not carry their own.
pub const DEFAULT_MODEL_VERSION: &str = "1.0.0";

// ============================================================================
// Environment
// ============================================================================

pub const ENV_CONFIG_PATH: &str = "PDM_CONFIG";
pub const ENV_SERVER_ADDR: &str = "PDM_SERVER_ADDR";
pub const ENV_TELEMETRY_URL: &str = "TELEMETRY_SERVICE_URL";
pub const ENV_SCORER_URL: &str = "ML_SERVICE_URL";
pub const ENV_UPSTREAM_TIMEOUT_MS: &str = "PDM_UPSTREAM_TIMEOUT_MS";
pub const ENV_CORS_ORIGINS: &str = "PDM_CORS_ORIGINS";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pdm_config.toml";
