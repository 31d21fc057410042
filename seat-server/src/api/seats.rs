//! Seat endpoints
//!
//! Writes go straight to Postgres; connected boards learn about them through
//! the `seat_board` notification, not from these responses.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{OccupyRequest, RenameRequest, Seat, SeatPatch, normalize_name};
use shared::util::now_hhmm;

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ServiceError>;

/// GET /api/seats: always the full board in id order
pub async fn list_seats(State(state): State<AppState>) -> ApiResult<Vec<Seat>> {
    let created = db::seats::seed_missing(&state.pool, &now_hhmm()).await?;
    if created > 0 {
        tracing::info!(created, "Seeded missing seats");
    }
    Ok(Json(db::seats::list(&state.pool).await?))
}

/// PUT /api/seats/{id}
pub async fn update_seat(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut patch): Json<SeatPatch>,
) -> ApiResult<Seat> {
    ensure_valid(id)?;
    if patch.is_empty() {
        return Err(AppError::invalid_request("Nothing to update").into());
    }
    if let Some(Some(name)) = &patch.name {
        patch.name = Some(Some(require_name(name)?));
    }
    apply_patch(&state, id, patch).await
}

/// POST /api/seats/{id}/occupy
pub async fn occupy_seat(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<OccupyRequest>,
) -> ApiResult<Seat> {
    ensure_valid(id)?;
    let name = require_name(&req.name)?;
    apply_patch(&state, id, SeatPatch::occupy(name)).await
}

/// POST /api/seats/{id}/release
pub async fn release_seat(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Seat> {
    ensure_valid(id)?;
    apply_patch(&state, id, SeatPatch::release()).await
}

/// PUT /api/seats/{id}/name
pub async fn rename_seat(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<Seat> {
    ensure_valid(id)?;
    let name = require_name(&req.name)?;
    apply_patch(&state, id, SeatPatch::rename(name)).await
}

fn ensure_valid(id: i32) -> Result<(), AppError> {
    if Seat::is_valid_id(id) {
        Ok(())
    } else {
        Err(AppError::seat_not_found(id))
    }
}

fn require_name(raw: &str) -> Result<String, AppError> {
    normalize_name(raw).ok_or_else(|| AppError::new(ErrorCode::SeatNameRequired))
}

async fn apply_patch(state: &AppState, id: i32, patch: SeatPatch) -> ApiResult<Seat> {
    let now = now_hhmm();
    let mut seat = db::seats::find(&state.pool, id)
        .await?
        .unwrap_or_else(|| Seat::empty(id, now.clone()));

    seat.apply(&patch);
    seat.updated_date = now;

    let saved = db::seats::upsert(&state.pool, &seat).await?;
    tracing::info!(
        seat_id = saved.id,
        is_occupied = saved.is_occupied,
        "Seat updated"
    );
    Ok(Json(saved))
}
