//! Feedback endpoint

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::FeedbackRequest;
use validator::Validate;

use crate::email;
use crate::error::ServiceError;
use crate::state::AppState;

/// POST /api/send-feedback
pub async fn send_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    req.validate()?;

    email::send_feedback(
        &state.ses,
        &state.ses_from_email,
        &state.feedback_to_email,
        &req,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Feedback mail failed");
        AppError::new(ErrorCode::MailDeliveryFailed)
    })?;

    Ok(Json(serde_json::json!({ "success": true })))
}
