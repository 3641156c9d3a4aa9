//! API error type and its JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use waqt_gate::{AuthError, EmptySecret, SchemaError, ValidationError};

/// Every rejection a request can receive. Each renders as a JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Not implemented")]
    NotImplemented,

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Auth(err) => json!({ "error": err.client_message() }),
            Self::Validation(ValidationError::MalformedBody(_)) => {
                json!({ "error": "Invalid request body" })
            }
            Self::Validation(ValidationError::FieldValidationFailed(messages)) => {
                json!({ "errors": messages })
            }
            other => json!({ "error": other.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Errors building the service from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("auth.jwt_secret: {0}")]
    Secret(#[from] EmptySecret),

    #[error("route schema: {0}")]
    Schema(#[from] SchemaError),
}
