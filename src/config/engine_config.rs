//! Engine configuration structs, TOML loading and env overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

fn default_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

/// Remote telemetry and scoring services. Unset URLs mean the local
/// synthesizer and scorer answer directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub telemetry_url: Option<String>,
    #[serde(default)]
    pub scorer_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { telemetry_url: None, scorer_url: None, timeout_ms: default_timeout_ms() }
    }
}

impl UpstreamConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

const fn default_timeout_ms() -> u64 {
    defaults::UPSTREAM_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_version")]
    pub version: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { version: default_model_version() }
    }
}

fn default_model_version() -> String {
    defaults::DEFAULT_MODEL_VERSION.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Config parse error ({}): {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl EngineConfig {
    /// Load config following the documented search order, then apply
    /// environment overrides. Never fails; problems are logged and skipped.
    pub fn load() -> Self {
        let mut config = Self::load_file_or_default();
        config.apply_env_overrides();
        config
    }

    fn load_file_or_default() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::ENV_CONFIG_PATH) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from PDM_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PDM_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PDM_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./pdm_config.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./pdm_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./pdm_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No pdm_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path. Missing sections take defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(addr) = get(defaults::ENV_SERVER_ADDR) {
            self.server.addr = addr;
        }
        if let Some(url) = get(defaults::ENV_TELEMETRY_URL) {
            self.upstream.telemetry_url = Some(url);
        }
        if let Some(url) = get(defaults::ENV_SCORER_URL) {
            self.upstream.scorer_url = Some(url);
        }
        if let Some(raw) = get(defaults::ENV_UPSTREAM_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => self.upstream.timeout_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid PDM_UPSTREAM_TIMEOUT_MS"),
            }
        }
    }

    /// Check cross-field constraints, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!("server.addr '{}' is not a socket address", self.server.addr));
        }
        if self.upstream.timeout_ms == 0 {
            errors.push("upstream.timeout_ms must be greater than 0".to_string());
        }
        for (name, url) in [
            ("upstream.telemetry_url", &self.upstream.telemetry_url),
            ("upstream.scorer_url", &self.upstream.scorer_url),
        ] {
            if let Some(url) = url {
                if reqwest::Url::parse(url).is_err() {
                    errors.push(format!("{name} '{url}' is not a valid URL"));
                }
            }
        }
        if self.model.version.trim().is_empty() {
            errors.push("model.version must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
