//! Tariff configuration handlers

use axum::{
    Json,
    extract::{Query, State},
};
use application::TariffUpdate;
use domain::{TariffConfig, TariffSnapshot};
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, middleware::JsonBody, state::AppState};

const DEFAULT_HISTORY_LIMIT: u32 = 20;
const MAX_HISTORY_LIMIT: u32 = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}

/// `GET /v1/tariff`
pub async fn current(State(state): State<AppState>) -> Result<Json<TariffSnapshot>, ApiError> {
    Ok(Json(state.services.tariffs.current().await?))
}

/// `GET /v1/tariff/history?limit=N`
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<TariffSnapshot>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(state.services.tariffs.history(limit).await?))
}

/// `PUT /v1/tariff`
///
/// Responds once the featured trips have been re-priced.
#[instrument(skip(state, config))]
pub async fn update(
    State(state): State<AppState>,
    JsonBody(config): JsonBody<TariffConfig>,
) -> Result<Json<TariffUpdate>, ApiError> {
    Ok(Json(state.services.tariffs.update(config).await?))
}
