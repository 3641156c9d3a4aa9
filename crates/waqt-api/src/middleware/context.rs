//! Request context plumbing.
//!
//! The gates store their results in a [`RequestContext`] kept in the
//! request's extensions, so it lives and dies with that request. Handlers
//! read it through the [`CallerIdentity`] and [`ValidatedInput`] extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, Extensions},
};
use waqt_gate::{AuthError, RequestContext, SubjectId, ValidatedBody};

use crate::error::ApiError;

/// Update the request's context, creating it on first use.
pub(crate) fn update_context(extensions: &mut Extensions, update: impl FnOnce(&mut RequestContext)) {
    let mut context = extensions.remove::<RequestContext>().unwrap_or_default();
    update(&mut context);
    extensions.insert(context);
}

/// Identity verified by the authentication gate.
///
/// Rejects with 401 when the route was reached without authentication,
/// e.g. on an excluded path.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub SubjectId);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|context| context.identity().cloned())
            .map(CallerIdentity)
            .ok_or(ApiError::Auth(AuthError::Unauthorized))
    }
}

/// Body accepted by the route's schema, moved out of the context.
#[derive(Debug, Clone)]
pub struct ValidatedInput(pub ValidatedBody);

#[async_trait]
impl<S> FromRequestParts<S> for ValidatedInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get_mut::<RequestContext>()
            .and_then(RequestContext::take_validated_body)
            .map(ValidatedInput)
            .ok_or_else(|| {
                tracing::error!(path = %parts.uri.path(), "handler expects a validated body but the route has no schema");
                ApiError::Internal
            })
    }
}
