use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::AccountError;

/// Single mapping from the account error taxonomy to HTTP responses.
///
/// Cross-tenant access is reported as 401, the same status as a missing token.
pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::MissingFields(_) => {
            json_error(StatusCode::BAD_REQUEST, "missing_fields", err.to_string())
        }
        AccountError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AccountError::EmailTaken | AccountError::OrganizationTaken => {
            json_error(StatusCode::BAD_REQUEST, "conflict", err.to_string())
        }
        AccountError::InvalidCredentials => {
            json_error(StatusCode::BAD_REQUEST, "invalid_credentials", err.to_string())
        }
        AccountError::Unauthorized(e) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string()),
        AccountError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        AccountError::Store(_) | AccountError::Password(_) | AccountError::Token(_) | AccountError::Internal(_) => {
            tracing::error!(error = %err, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
