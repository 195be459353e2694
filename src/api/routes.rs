use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::health::HealthState;

#[derive(Clone)]
pub struct ApiState {
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(get_health))
        .with_state(state)
}

async fn root() -> &'static str {
    "matchday bot is running"
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub last_tick_unix: i64,
    pub tracked_fixtures: u64,
    pub notifications_sent: u64,
    pub news_posted: u64,
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        last_tick_unix: state.health.last_tick_unix(),
        tracked_fixtures: state.health.tracked_fixtures(),
        notifications_sent: state.health.notifications_sent(),
        news_posted: state.health.news_posted(),
    })
}
