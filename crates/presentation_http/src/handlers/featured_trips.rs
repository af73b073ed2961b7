//! Featured trip maintenance

use application::RefreshReport;
use axum::{Json, extract::State};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// `POST /v1/featured-trips/refresh`
///
/// Re-prices every published trip with the current tariff.
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshReport>, ApiError> {
    let tariff = state.services.tariffs.current().await?;
    let report = state.services.refresher.refresh_all(&tariff.config).await?;
    Ok(Json(report))
}
