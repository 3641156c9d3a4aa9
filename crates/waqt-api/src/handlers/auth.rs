//! Account handlers under `/api/v1/auth`.
//!
//! Persistence, password hashing and the Google handshake live outside this
//! service's gate logic, so these handlers acknowledge the validated request
//! without acting on it.

use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{CallerIdentity, ValidatedInput};
use crate::models::{GoogleCallbackRequest, GoogleLoginRequest, LoginRequest, UserCreateRequest};

fn decode<T: serde::de::DeserializeOwned>(input: ValidatedInput) -> Result<T, ApiError> {
    input.0.deserialize().map_err(|err| {
        tracing::error!(error = %err, "validated body does not match its request type");
        ApiError::Internal
    })
}

/// POST /api/v1/auth/signup
pub async fn signup(input: ValidatedInput) -> Result<Json<Value>, ApiError> {
    let request: UserCreateRequest = decode(input)?;
    tracing::info!(username = %request.username, "signup requested");
    Ok(Json(json!({ "message": "SignUp successful" })))
}

/// POST /api/v1/auth/login
pub async fn login(input: ValidatedInput) -> Result<Json<Value>, ApiError> {
    let request: LoginRequest = decode(input)?;
    tracing::info!(identifier = %request.identifier, "login requested");
    Ok(Json(json!({ "message": "Login successful" })))
}

/// POST /api/v1/auth/google/login
pub async fn google_login(input: ValidatedInput) -> Result<Json<Value>, ApiError> {
    let _request: GoogleLoginRequest = decode(input)?;
    Ok(Json(json!({ "message": "Google login successful" })))
}

/// POST /api/v1/auth/google/callback
pub async fn google_callback(input: ValidatedInput) -> Result<Json<Value>, ApiError> {
    let request: GoogleCallbackRequest = decode(input)?;
    tracing::debug!(has_state = !request.state.is_empty(), "google callback received");
    Ok(Json(json!({ "message": "Google callback successful" })))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    CallerIdentity(caller): CallerIdentity,
    _input: ValidatedInput,
) -> Json<Value> {
    tracing::info!(caller = %caller, "logout requested");
    Json(json!({ "message": "Logout successful" }))
}

/// GET /api/v1/auth/me
pub async fn me(CallerIdentity(caller): CallerIdentity) -> Json<Value> {
    Json(json!({ "id": caller }))
}
