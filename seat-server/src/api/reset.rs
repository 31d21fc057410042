//! Board reset endpoint

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::ResetRequest;
use shared::util::now_hhmm;

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

/// POST /api/reset-seats
pub async fn reset_seats(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    if req.authorization.is_empty() || req.authorization != state.reset_api_key {
        tracing::warn!("Board reset rejected: bad key");
        return Err(AppError::new(ErrorCode::InvalidApiKey).into());
    }

    let seats = db::reset_board(&state.pool, &now_hhmm()).await?;
    tracing::info!(seats = seats.len(), "Board reset");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Seats have been reset",
        "seats": seats,
    })))
}
