//! Domain error type shared by the storage, scoring and API layers.

use axum::http::StatusCode;

use crate::types::AlertStatus;
use crate::upstream::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed or missing caller input.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{0} not found")]
    NotFound(String),

    /// A lifecycle transition was refused because of the record's current status.
    #[error("Alert is already {status}")]
    Conflict { id: String, status: AlertStatus },

    /// Absorbed by the orchestrator; only reaches callers that bypass it.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error envelope.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::UpstreamUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_names_status() {
        let err = EngineError::Conflict { id: "alert-1".into(), status: AlertStatus::Acknowledged };
        assert_eq!(err.to_string(), "Alert is already acknowledged");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_codes() {
        assert_eq!(EngineError::not_found("Alert alert-9").to_string(), "Alert alert-9 not found");
        assert_eq!(EngineError::validation("risk", "bad").code(), "BAD_REQUEST");
        assert_eq!(EngineError::Internal("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
