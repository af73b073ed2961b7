//! Address suggestion handler

use axum::{Json, extract::State};
use domain::AddressCandidate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::ApiError,
    middleware::{ClientKey, JsonBody},
    state::AppState,
};

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeBody {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub results: Vec<AddressCandidate>,
}

/// `POST /v1/geocode`
#[instrument(skip_all, fields(client = %client.as_str()))]
pub async fn geocode(
    State(state): State<AppState>,
    client: ClientKey,
    JsonBody(body): JsonBody<GeocodeBody>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let results = state
        .services
        .geocoding
        .geocode(&body.address, client.as_str())
        .await?;
    Ok(Json(GeocodeResponse { results }))
}
