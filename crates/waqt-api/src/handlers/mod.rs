//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod settings;

pub use auth::{google_callback, google_login, login, logout, me, signup};
pub use health::health;
pub use settings::{get_settings, update_settings};
