//! Density endpoints

use axum::{Json, extract::State};
use shared::models::{Density, DensityUpdate};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

/// GET /api/density
pub async fn get_density(State(state): State<AppState>) -> Result<Json<DensityUpdate>, ServiceError> {
    let density = db::settings::ensure_density(&state.pool).await?;
    Ok(Json(DensityUpdate {
        value: density.into(),
    }))
}

/// PUT /api/density: out-of-range values are clamped, not rejected
pub async fn set_density(
    State(state): State<AppState>,
    Json(req): Json<DensityUpdate>,
) -> Result<Json<DensityUpdate>, ServiceError> {
    let density = Density::clamped(req.value);
    db::settings::set_density(&state.pool, density).await?;
    tracing::info!(density = density.value(), "Density updated");
    Ok(Json(DensityUpdate {
        value: density.into(),
    }))
}
