// =============================================================================
// MBR Dashboard — Main Entry Point
// =============================================================================
//
// Synthesizes six months of KPI data, annotates it with target variance and
// RAG status, prints the report and, when a bind address is configured,
// serves the same snapshot over the REST API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chart;
mod dashboard;
mod error;
mod evaluator;
mod kpi;
mod report;
mod risk;
mod runtime_config;
mod synthesizer;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::dashboard::Dashboard;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "mbr_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("MBR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = RuntimeConfig::load_or_init(&config_path);
    config.apply_env_overrides();

    info!(
        start_month = %config.start_month,
        months = config.months,
        seed = ?config.seed,
        selected_kpi = %config.selected_kpi,
        "Building dashboard"
    );

    // ── 2. Synthesize, annotate, summarize ───────────────────────────────
    let dashboard = Dashboard::build(&config).context("rejected dashboard configuration")?;
    if let Some(latest) = dashboard.latest() {
        info!(month = %latest.month_label, risks = dashboard.risks.len(), "Latest month evaluated");
    }

    // ── 3. Console report ────────────────────────────────────────────────
    println!("{}", report::Report::new(&dashboard, config.selected_kpi));

    // ── 4. Optional API server ───────────────────────────────────────────
    let Some(bind_addr) = config.bind_addr.clone() else {
        return Ok(());
    };

    let state = Arc::new(AppState::new(dashboard, config.selected_kpi));
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("MBR dashboard shut down complete.");
    Ok(())
}
