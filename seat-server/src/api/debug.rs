//! Diagnostics

use axum::{Json, extract::State};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

const DEBUG_HISTORY_LIMIT: i64 = 50;

/// GET /api/debug/density-history
pub async fn density_history(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let rows = db::history::latest(&state.pool, DEBUG_HISTORY_LIMIT).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": rows.len(),
        "message": format!("Fetched {} rows from density_history", rows.len()),
        "data": rows,
    })))
}
