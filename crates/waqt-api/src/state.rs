//! Shared, read-only application state.

use std::sync::Arc;
use std::time::Duration;

use waqt_gate::{Authenticator, ExclusionList, SigningSecret};

use crate::config::AppConfig;
use crate::error::StartupError;
use crate::models::RouteSchemas;

/// Everything the router needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Gate for `/api/v1/auth`, honouring the configured exclusions.
    pub auth_gate: Arc<Authenticator>,
    /// Gate for routes that always require a token.
    pub strict_gate: Arc<Authenticator>,
    pub schemas: Arc<RouteSchemas>,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let secret = SigningSecret::new(&config.auth.jwt_secret)?;
        let strict_gate = Authenticator::new(secret).with_leeway(config.auth.leeway_secs);
        let auth_gate = strict_gate
            .clone()
            .with_exclusions(ExclusionList::new(config.auth.excluded_paths.iter().cloned()));

        Ok(Self {
            auth_gate: Arc::new(auth_gate),
            strict_gate: Arc::new(strict_gate),
            schemas: Arc::new(RouteSchemas::new()?),
            max_body_bytes: config.server.max_body_bytes,
            request_timeout: config.server.request_timeout(),
        })
    }
}
