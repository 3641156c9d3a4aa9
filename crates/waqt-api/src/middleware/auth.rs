//! Bearer token authentication middleware.
//!
//! Runs the [`Authenticator`] for every request on the routes it guards:
//! - Excluded path prefixes pass through untouched
//! - A verified token stores the caller's id in the request context
//! - Anything else is answered with 401 and a JSON error body; the
//!   handler never runs
//!
//! Paths are matched as seen by the router the layer is attached to, so
//! under a nested router the mount prefix is already stripped.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use waqt_gate::{AuthError, AuthOutcome, Authenticator};

use crate::error::ApiError;
use crate::middleware::context::update_context;

pub async fn auth_middleware(
    State(gate): State<Arc<Authenticator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let outcome = match request.headers().get(AUTHORIZATION) {
        None => gate.authenticate(&path, None),
        Some(value) => match value.to_str() {
            Ok(header) => gate.authenticate(&path, Some(header)),
            // Opaque bytes can never form a compact token.
            Err(_) if !gate.exclusions().is_excluded(&path) => Err(AuthError::InvalidOrExpiredToken),
            Err(_) => Ok(AuthOutcome::Excluded),
        },
    };

    match outcome {
        Ok(AuthOutcome::Excluded) => next.run(request).await,
        Ok(AuthOutcome::Authenticated(identity)) => {
            tracing::debug!(path = %path, caller = %identity, "request authenticated");
            update_context(request.extensions_mut(), |ctx| ctx.set_identity(identity));
            next.run(request).await
        }
        Err(err) => {
            tracing::info!(path = %path, reason = %err, "request rejected by authentication gate");
            ApiError::from(err).into_response()
        }
    }
}
