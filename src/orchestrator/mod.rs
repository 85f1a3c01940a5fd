//! Fallback Orchestrator
//!
//! Runs one prediction through two ordered strategy chains:
//!
//! 1. Telemetry: each [`TelemetryProvider`] in priority order, local synthesis last
//! 2. Scoring: each [`ScoringStrategy`] in priority order, local scoring last
//!
//! Every attempt is wrapped in `tokio::time::timeout`; a timeout counts as a
//! failure of that stage. Failures are logged at warn and the next strategy
//! runs. The terminal local strategies cannot fail, so [`FallbackOrchestrator::predict`]
//! always produces a result.

mod strategies;

pub use strategies::*;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::UpstreamConfig;
use crate::types::{PredictionResult, TelemetryInput, TelemetryWindow};
use crate::upstream::{UpstreamClient, UpstreamError};

/// One prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub machine_id: String,
    pub window: TelemetryWindow,
}

impl PredictionRequest {
    pub fn new(machine_id: impl Into<String>, window: TelemetryWindow) -> Self {
        Self { machine_id: machine_id.into(), window }
    }
}

/// Source of telemetry for a prediction.
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    async fn fetch(&self, request: &PredictionRequest) -> Result<TelemetryInput, UpstreamError>;

    /// Name for logging and provenance (e.g. "remote-telemetry").
    fn provider_name(&self) -> &'static str;
}

/// Turns telemetry into a prediction.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    async fn score(
        &self,
        request: &PredictionRequest,
        telemetry: &TelemetryInput,
    ) -> Result<PredictionResult, UpstreamError>;

    /// Name for logging and provenance (e.g. "remote-scorer").
    fn strategy_name(&self) -> &'static str;
}

/// A prediction plus which strategies produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub telemetry: TelemetryInput,
    pub telemetry_source: &'static str,
    pub scored_by: &'static str,
}

pub struct FallbackOrchestrator {
    telemetry_chain: Vec<Arc<dyn TelemetryProvider>>,
    scoring_chain: Vec<Arc<dyn ScoringStrategy>>,
    local_telemetry: LocalSynthesis,
    local_scoring: LocalScoring,
    stage_timeout: Duration,
}

impl FallbackOrchestrator {
    /// Orchestrator with no remote stages.
    pub fn local_only(stage_timeout: Duration) -> Self {
        Self {
            telemetry_chain: Vec::new(),
            scoring_chain: Vec::new(),
            local_telemetry: LocalSynthesis,
            local_scoring: LocalScoring,
            stage_timeout,
        }
    }

    /// Build the chains from upstream config: a remote stage for each
    /// configured URL, ahead of the local fallback.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let timeout = config.timeout();
        let mut orchestrator = Self::local_only(timeout);

        if let Some(url) = &config.telemetry_url {
            let client = UpstreamClient::new(url, timeout)?;
            info!(url = %url, "Remote telemetry service enabled");
            orchestrator = orchestrator.with_telemetry_provider(Arc::new(RemoteTelemetry::new(client)));
        }
        if let Some(url) = &config.scorer_url {
            let client = UpstreamClient::new(url, timeout)?;
            info!(url = %url, "Remote scoring service enabled");
            orchestrator = orchestrator.with_scoring_strategy(Arc::new(RemoteScorer::new(client)));
        }
        Ok(orchestrator)
    }

    /// Append a provider after those already registered, ahead of local synthesis.
    #[must_use]
    pub fn with_telemetry_provider(mut self, provider: Arc<dyn TelemetryProvider>) -> Self {
        self.telemetry_chain.push(provider);
        self
    }

    /// Append a strategy after those already registered, ahead of local scoring.
    #[must_use]
    pub fn with_scoring_strategy(mut self, strategy: Arc<dyn ScoringStrategy>) -> Self {
        self.scoring_chain.push(strategy);
        self
    }

    /// Produce a prediction. Never fails.
    pub async fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.predict_traced(request).await.result
    }

    /// Produce a prediction along with the telemetry used and its provenance.
    pub async fn predict_traced(&self, request: &PredictionRequest) -> PredictionOutcome {
        let (telemetry, telemetry_source) = self.resolve_telemetry(request).await;
        let (result, scored_by) = self.resolve_score(request, &telemetry).await;

        info!(
            machine_id = %request.machine_id,
            telemetry_source,
            scored_by,
            score = result.score,
            risk = %result.risk,
            "Prediction complete"
        );

        PredictionOutcome { result, telemetry, telemetry_source, scored_by }
    }

    async fn resolve_telemetry(&self, request: &PredictionRequest) -> (TelemetryInput, &'static str) {
        for provider in &self.telemetry_chain {
            let name = provider.provider_name();
            match self.attempt(provider.fetch(request)).await {
                Ok(telemetry) => return (telemetry, name),
                Err(e) => warn!(
                    machine_id = %request.machine_id,
                    stage = name,
                    error = %e,
                    "Telemetry stage failed, falling back"
                ),
            }
        }
        (self.local_telemetry.synthesize(request), LocalSynthesis::NAME)
    }

    async fn resolve_score(
        &self,
        request: &PredictionRequest,
        telemetry: &TelemetryInput,
    ) -> (PredictionResult, &'static str) {
        for strategy in &self.scoring_chain {
            let name = strategy.strategy_name();
            match self.attempt(strategy.score(request, telemetry)).await {
                Ok(result) => return (result, name),
                Err(e) => warn!(
                    machine_id = %request.machine_id,
                    stage = name,
                    error = %e,
                    "Scoring stage failed, falling back"
                ),
            }
        }
        (self.local_scoring.evaluate(request, telemetry), LocalScoring::NAME)
    }

    async fn attempt<T>(
        &self,
        stage: impl Future<Output = Result<T, UpstreamError>> + Send,
    ) -> Result<T, UpstreamError> {
        tokio::time::timeout(self.stage_timeout, stage)
            .await
            .unwrap_or(Err(UpstreamError::Timeout(self.stage_timeout)))
    }
}
