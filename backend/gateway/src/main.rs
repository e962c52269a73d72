//! Charity crowdfunding gateway — entry point.
//!
//! Hosts the crowdfunding engine in-process, runs a background indexer that
//! copies the engine's event journal into SQLite, and exposes an Axum REST
//! API for creating, funding and closing campaigns.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod indexer;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use charity_crowdfunding::{
    CharityCrowdfunding, InMemoryValueLedger, Principal, RewardLedger, SystemClock,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use indexer::IndexerState;

/// The engine as hosted by the gateway.
pub type Engine = CharityCrowdfunding<InMemoryValueLedger, SystemClock>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // ─── Engine ───────────────────────────────────────────
    let rail = InMemoryValueLedger::new();
    let engine = Arc::new(CharityCrowdfunding::new(
        Principal::new(config.contract_principal.clone()),
        RewardLedger::new(),
        rail.clone(),
        SystemClock,
    )?);
    if config.enable_dev_faucet {
        info!("Dev faucet enabled at POST /accounts/:principal/fund");
    }

    // ─── Background indexer ───────────────────────────────
    let shutdown = CancellationToken::new();
    let indexer_state = Arc::new(IndexerState {
        pool: pool.clone(),
        config: config.clone(),
        engine: Arc::clone(&engine),
        run_id: chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string(),
    });
    let indexer = tokio::spawn(indexer::run(indexer_state, shutdown.clone()));

    // ─── REST API ─────────────────────────────────────────
    let api_state = Arc::new(api::ApiState {
        pool,
        engine,
        rail,
        enable_dev_faucet: config.enable_dev_faucet,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route(
            "/campaigns",
            get(api::list_campaigns).post(api::create_campaign),
        )
        .route("/campaigns/:id", get(api::get_campaign))
        .route("/campaigns/:id/active", get(api::is_active))
        .route(
            "/campaigns/:id/donations/:principal",
            get(api::get_donation),
        )
        .route("/campaigns/:id/donate", post(api::donate))
        .route("/campaigns/:id/finalize", post(api::finalize_campaign))
        .route("/campaigns/:id/withdraw", post(api::withdraw_funds))
        .route("/campaigns/:id/events", get(api::get_campaign_events))
        .route("/rewards", get(api::reward_token))
        .route("/rewards/:principal", get(api::reward_balance))
        .route("/accounts/:principal/balance", get(api::account_balance))
        .route("/accounts/:principal/fund", post(api::fund_account))
        .route("/events", get(api::get_all_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(api_state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    indexer.await?;
    Ok(())
}
