//! Prediction service proxy

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use shared::error::ErrorCode;
use shared::models::TodayTomorrow;

use crate::prediction::PredictionError;
use crate::state::AppState;

/// Upstream failure, rendered as `503 {success: false, error, data: null}`
pub struct Unavailable(PredictionError);

impl From<PredictionError> for Unavailable {
    fn from(e: PredictionError) -> Self {
        Unavailable(e)
    }
}

impl IntoResponse for Unavailable {
    fn into_response(self) -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "code": ErrorCode::PredictionUnavailable.code(),
                "error": self.0.to_string(),
                "data": null,
                "details": "The prediction service could not be reached. Please try again later.",
            })),
        )
            .into_response()
    }
}

/// GET /api/predictions/today-tomorrow
pub async fn today_tomorrow(State(state): State<AppState>) -> Result<Json<Value>, Unavailable> {
    let data = state.predictions.today_tomorrow().await?;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(json!({
        "success": true,
        "data": TodayTomorrow::from_ml(data, today),
    })))
}

/// GET /api/predictions/weekly-averages
pub async fn weekly_averages(State(state): State<AppState>) -> Result<Json<Value>, Unavailable> {
    Ok(Json(state.predictions.weekly_averages().await?))
}

/// GET /api/predictions/weekly
pub async fn weekly(State(state): State<AppState>) -> Result<Json<Value>, Unavailable> {
    let days = state.predictions.weekly().await?;
    Ok(Json(json!({ "success": true, "data": days })))
}

/// GET /api/predictions/weekly-average (retired)
pub async fn weekly_average_gone() -> Response {
    (
        StatusCode::GONE,
        Json(json!({
            "success": false,
            "code": ErrorCode::EndpointGone.code(),
            "error": "This endpoint has been retired; use /api/predictions/weekly-averages",
            "data": null,
        })),
    )
        .into_response()
}
