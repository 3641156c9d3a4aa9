//! Settings handlers under `/api/v1/settings`. Not implemented yet; both
//! still run behind the authentication and validation gates.

use crate::error::ApiError;
use crate::middleware::{CallerIdentity, ValidatedInput};
use crate::models::SettingsUpdateRequest;

/// GET /api/v1/settings
pub async fn get_settings(CallerIdentity(caller): CallerIdentity) -> ApiError {
    tracing::debug!(caller = %caller, "settings requested");
    ApiError::NotImplemented
}

/// PUT /api/v1/settings/update
pub async fn update_settings(
    CallerIdentity(caller): CallerIdentity,
    ValidatedInput(body): ValidatedInput,
) -> ApiError {
    match body.deserialize::<SettingsUpdateRequest>() {
        Ok(update) => tracing::debug!(caller = %caller, ?update, "settings update requested"),
        Err(err) => tracing::error!(error = %err, "validated body does not match its request type"),
    }
    ApiError::NotImplemented
}
