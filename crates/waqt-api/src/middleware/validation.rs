//! Request body validation middleware.
//!
//! Attached per route with the route's [`Schema`]:
//! 1. GET, HEAD, DELETE and OPTIONS requests pass through unread
//! 2. The body is buffered up to the configured limit (413 beyond it)
//! 3. The schema decodes and checks it; failures return 400
//! 4. On success the validated body goes into the request context and the
//!    original bytes are handed on to the handler

use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use waqt_gate::{Schema, ValidationError};

use crate::error::ApiError;
use crate::middleware::context::update_context;

/// Middleware state: one route's schema plus the body size limit.
#[derive(Debug, Clone)]
pub struct BodySchema {
    schema: Arc<Schema>,
    max_body_bytes: usize,
}

impl BodySchema {
    pub fn new(schema: Arc<Schema>, max_body_bytes: usize) -> Self {
        Self {
            schema,
            max_body_bytes,
        }
    }
}

/// Methods whose requests carry no body to validate.
pub fn skips_body(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD || method == Method::DELETE || method == Method::OPTIONS
}

pub async fn validation_middleware(
    State(gate): State<BodySchema>,
    request: Request,
    next: Next,
) -> Response {
    if skips_body(request.method()) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, gate.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) if exceeded_limit(&err) => {
            tracing::info!(path = %parts.uri.path(), limit = gate.max_body_bytes, "request body over limit");
            return ApiError::BodyTooLarge.into_response();
        }
        Err(err) => {
            tracing::info!(path = %parts.uri.path(), error = %err, "failed to read request body");
            return ApiError::from(ValidationError::MalformedBody(err.to_string())).into_response();
        }
    };

    match gate.schema.validate(&bytes) {
        Ok(validated) => {
            update_context(&mut parts.extensions, |ctx| ctx.set_validated_body(validated));
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(err) => {
            tracing::debug!(path = %parts.uri.path(), reason = %err, "request rejected by validation gate");
            ApiError::from(err).into_response()
        }
    }
}

fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}
