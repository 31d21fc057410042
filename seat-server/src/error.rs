//! Service-layer error type for seat-server
//!
//! `ServiceError` lets handlers use `?` on DB-layer results (`sqlx::Error`,
//! `BoxError`) and business errors (`AppError`) alike.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: database/infrastructure failure (logged, hidden from the client)
/// - `App`: business-rule error, passed through as-is
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut err = AppError::validation("Invalid request body");
        for (field, errors) in e.field_errors() {
            let codes: Vec<String> = errors.iter().map(|v| v.code.to_string()).collect();
            err = err.with_detail(field.to_string(), codes);
        }
        ServiceError::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use shared::models::FeedbackRequest;
    use validator::Validate;

    #[test]
    fn db_errors_are_masked() {
        let err: AppError = ServiceError::Db("connection reset".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("connection reset"));
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_list_fields() {
        let req = FeedbackRequest {
            name: "Nao".into(),
            email: "nope".into(),
            message: "Long enough message".into(),
        };
        let err: AppError = ServiceError::from(req.validate().unwrap_err()).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.details.as_ref().unwrap().contains_key("email"));
    }
}
