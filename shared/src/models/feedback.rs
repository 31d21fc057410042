//! Feedback form

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/send-feedback`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 10, max = 5000))]
    pub message: String,
}
