//! PdM Engine server
//!
//! Serves the `/api/v2` dashboard backend. Remote telemetry and scoring
//! services are optional; without them every prediction is synthesized and
//! scored locally.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use pdm_engine::api::{create_app, DashboardState};
use pdm_engine::config::{self, EngineConfig};
use pdm_engine::{FallbackOrchestrator, Store};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pdm-engine")]
#[command(about = "Predictive-maintenance telemetry synthesis and health scoring engine")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to an engine config TOML (default: $PDM_CONFIG, then ./pdm_config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load the demo dataset on startup
    #[arg(long)]
    seed_demo: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    }
}

fn load_config(args: &CliArgs) -> Result<EngineConfig> {
    let mut engine_config = match &args.config {
        Some(path) => {
            let mut loaded = EngineConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            loaded.apply_env_overrides();
            info!(path = %path.display(), "Loaded engine config from --config");
            loaded
        }
        None => EngineConfig::load(),
    };
    if let Some(addr) = &args.addr {
        engine_config.server.addr.clone_from(addr);
    }
    engine_config.validate().context("Invalid engine configuration")?;
    Ok(engine_config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    init_tracing(args.log_json);

    config::init(load_config(&args)?);
    let engine_config = config::get();

    let store = Arc::new(Store::new());
    if args.seed_demo {
        store.reseed(Utc::now());
    }

    let orchestrator = FallbackOrchestrator::from_config(&engine_config.upstream)
        .context("Failed to build upstream clients")?;
    info!(
        timeout_ms = engine_config.upstream.timeout_ms,
        telemetry = engine_config.upstream.telemetry_url.as_deref().unwrap_or("local"),
        scorer = engine_config.upstream.scorer_url.as_deref().unwrap_or("local"),
        "Prediction pipeline configured"
    );

    let state = DashboardState::new(store, Arc::new(orchestrator), engine_config.model.version.clone());
    let app = create_app(state);

    let addr = &engine_config.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("✓ HTTP server listening on {}", addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    match result {
        Ok(()) => {
            info!("Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "HTTP server error");
            Err(anyhow::anyhow!("HTTP server error: {e}"))
        }
    }
}
