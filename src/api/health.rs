use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub enabled_chains: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let endpoints = state.history.endpoints();
    let enabled_chains = crate::chains::all()
        .iter()
        .filter(|d| d.is_enabled(endpoints))
        .count();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        enabled_chains,
    })
}
