mod api;
mod config;
mod diff;
mod dispatch;
mod error;
mod gateway;
mod news;
mod poller;
mod schedule;
mod state;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::{Config, API_FOOTBALL_URL};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::gateway::FootballGateway;
use crate::poller::LivePoller;
use crate::schedule::ScheduleDigest;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let health = Arc::new(HealthState::new());

    // --- Outbound messaging ---
    let dispatcher = Arc::new(Dispatcher::new(&cfg));
    if dispatcher.enabled() {
        dispatcher
            .send_text("⚽ <b>Matchday bot is up and running.</b>")
            .await;
    } else {
        warn!("BOT_TOKEN/CHAT_ID not set — notifications will be logged, not delivered");
    }

    // --- Fixture data gateway ---
    let gateway = match &cfg.api_football_key {
        Some(key) => Some(FootballGateway::new(API_FOOTBALL_URL, key)),
        None => {
            warn!("API_FOOTBALL_KEY not set — fixture polling disabled, news only");
            None
        }
    };

    // --- Side task: daily schedule digest (hourly) ---
    if let Some(gateway) = gateway.clone() {
        let digest = ScheduleDigest::new(gateway, Arc::clone(&dispatcher));
        tokio::spawn(async move { digest.run().await });
    }

    // --- Poll loop (single worker, owns all core mutable state) ---
    info!(
        interval_secs = cfg.poll_interval_secs,
        feeds = cfg.rss_sources.len(),
        "starting poll loop",
    );
    let poller = LivePoller::new(
        cfg.clone(),
        gateway,
        Arc::clone(&dispatcher),
        Arc::clone(&health),
    );
    tokio::spawn(async move { poller.run().await });

    // --- Health endpoint (liveness only; never touches the fixture store) ---
    let app = router(ApiState { health });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("health endpoint listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
