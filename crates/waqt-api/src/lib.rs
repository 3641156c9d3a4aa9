//! # Waqt API
//!
//! REST service for Waqt. Every request passes the authentication gate and,
//! on routes with a body schema, the validation gate before a handler runs.
//!
//! ## Modules
//!
//! - `config`: layered configuration (file + environment)
//! - `state`: gates and schemas shared by all requests
//! - `middleware`: axum adapters for the gates and the handler extractors
//! - `models`: per-route body schemas and typed request bodies
//! - `handlers`: terminal handlers
//! - `router`: route table and service-wide layers

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod state;

pub use error::{ApiError, StartupError};
pub use router::create_router;
pub use state::AppState;
