//! Middleware layers
//!
//! ## Available Middleware
//!
//! - `auth`: bearer token authentication, sets the caller identity
//! - `validation`: route-bound body schema validation, sets the validated body
//! - `context`: per-request context plumbing and the handler extractors

pub mod auth;
pub mod context;
pub mod validation;

// Re-exports
pub use auth::auth_middleware;
pub use context::{CallerIdentity, ValidatedInput};
pub use validation::{validation_middleware, BodySchema};
