//! Upstream Client: HTTP client for remote telemetry and scoring services

use chrono::SecondsFormat;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

use super::RemoteScore;
use crate::config::defaults;
use crate::types::{TelemetryInput, TelemetryWindow};

/// Upstream client errors
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
    #[error("Invalid upstream URL '{0}'")]
    InvalidUrl(String),
}

/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Create a client whose requests are bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|_| UpstreamError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_millis(defaults::UPSTREAM_CONNECT_TIMEOUT_MS)))
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Base URL extended by path segments; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET {base}/api/v2/telemetry/{id}?startDate&endDate`
    pub async fn fetch_telemetry(
        &self,
        machine_id: &str,
        window: &TelemetryWindow,
    ) -> Result<TelemetryInput, UpstreamError> {
        let mut url = self.endpoint(&["api", "v2", "telemetry", machine_id])?;
        url.query_pairs_mut()
            .append_pair("startDate", &window.start.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("endDate", &window.end.to_rfc3339_opts(SecondsFormat::Secs, true));

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::ServerError(resp.status()));
        }

        let body = strip_envelope(resp.json::<Value>().await?);
        let telemetry = body
            .get("telemetry")
            .cloned()
            .ok_or_else(|| UpstreamError::Malformed("response has no telemetry".into()))?;
        serde_json::from_value(telemetry).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }

    /// `POST {base}/predict` with `{machineId, telemetry}`
    pub async fn score(
        &self,
        machine_id: &str,
        telemetry: &TelemetryInput,
    ) -> Result<RemoteScore, UpstreamError> {
        let url = self.endpoint(&["predict"])?;
        let body = serde_json::json!({
            "machineId": machine_id,
            "telemetry": telemetry,
        });

        let resp = self.http.post(url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::ServerError(resp.status()));
        }

        let body = strip_envelope(resp.json::<Value>().await?);
        serde_json::from_value(body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

/// Unwrap a `{data, meta}` envelope; other bodies pass through.
fn strip_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("meta") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
