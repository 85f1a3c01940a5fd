//! Concrete telemetry providers and scoring strategies.

use async_trait::async_trait;

use super::{PredictionRequest, ScoringStrategy, TelemetryProvider};
use crate::scoring::{self, failure_modes};
use crate::telemetry;
use crate::types::{PredictionResult, TelemetryInput};
use crate::upstream::{UpstreamClient, UpstreamError};

// ============================================================================
// Remote stages
// ============================================================================

/// Telemetry from a remote telemetry service.
#[derive(Debug, Clone)]
pub struct RemoteTelemetry {
    client: UpstreamClient,
}

impl RemoteTelemetry {
    pub const NAME: &'static str = "remote-telemetry";

    pub const fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TelemetryProvider for RemoteTelemetry {
    async fn fetch(&self, request: &PredictionRequest) -> Result<TelemetryInput, UpstreamError> {
        self.client.fetch_telemetry(&request.machine_id, &request.window).await
    }

    fn provider_name(&self) -> &'static str {
        Self::NAME
    }
}

/// Prediction from a remote scoring service.
#[derive(Debug, Clone)]
pub struct RemoteScorer {
    client: UpstreamClient,
}

impl RemoteScorer {
    pub const NAME: &'static str = "remote-scorer";

    pub const fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScoringStrategy for RemoteScorer {
    async fn score(
        &self,
        request: &PredictionRequest,
        telemetry: &TelemetryInput,
    ) -> Result<PredictionResult, UpstreamError> {
        self.client
            .score(&request.machine_id, telemetry)
            .await?
            .into_prediction(&request.machine_id)
    }

    fn strategy_name(&self) -> &'static str {
        Self::NAME
    }
}

// ============================================================================
// Local terminal stages
// ============================================================================

/// Synthesized telemetry; the terminal telemetry stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSynthesis;

impl LocalSynthesis {
    pub const NAME: &'static str = "local-synthesis";

    pub fn synthesize(self, request: &PredictionRequest) -> TelemetryInput {
        telemetry::synthesize(&request.machine_id, &request.window).into()
    }
}

/// In-process health scoring; the terminal scoring stage.
///
/// Failure types come from the per-machine approximation and
/// responsibilities are left empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScoring;

impl LocalScoring {
    pub const NAME: &'static str = "local-scorer";

    pub fn evaluate(self, request: &PredictionRequest, telemetry: &TelemetryInput) -> PredictionResult {
        let mut result = scoring::score(&request.machine_id, telemetry);
        result.failure_types = Some(failure_modes::id_estimate(&request.machine_id));
        result.feature_responsibilities = Some(Vec::new());
        result
    }
}
