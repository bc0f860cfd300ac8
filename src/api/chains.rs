use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    chains::{self, Access, ChainDescriptor, ChainEndpoints, ChainId},
    models::ApiResponse,
};

use super::AppState;

/// Everything the chain picker and the pre-search info card display.
#[derive(Debug, Serialize)]
pub struct ChainInfo {
    pub id: ChainId,
    pub name: &'static str,
    pub ticker: &'static str,
    pub color: &'static str,
    pub placeholder: &'static str,
    pub note: &'static str,
    pub access: Access,
    pub supported: bool,
}

fn chain_info(descriptor: &ChainDescriptor, endpoints: &ChainEndpoints) -> ChainInfo {
    ChainInfo {
        id: descriptor.id,
        name: descriptor.name,
        ticker: descriptor.ticker,
        color: descriptor.color,
        placeholder: descriptor.placeholder,
        note: descriptor.note,
        access: descriptor.access,
        supported: descriptor.is_enabled(endpoints),
    }
}

/// GET /api/v1/chains
pub async fn list_chains(State(state): State<AppState>) -> Json<ApiResponse<Vec<ChainInfo>>> {
    let endpoints = state.history.endpoints();
    let chains = chains::all()
        .iter()
        .map(|d| chain_info(d, endpoints))
        .collect();
    Json(ApiResponse::success(chains))
}
