//! Body schemas bound to routes, and the typed bodies handlers read.
//!
//! Each schema is built once at startup and shared by every request to its
//! route. Handlers convert the validated body into the matching struct with
//! [`waqt_gate::ValidatedBody::deserialize`].

use std::sync::Arc;

use serde::Deserialize;
use waqt_gate::{FieldType, Schema, SchemaError};

#[derive(Deserialize)]
pub struct UserCreateRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub first_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackRequest {
    pub code: String,
    pub state: String,
}

/// Settings body. The wire keys `theme_reference` and
/// `task_reminder_inter` are the names existing clients already send.
#[derive(Debug, Deserialize)]
pub struct SettingsUpdateRequest {
    #[serde(rename = "theme_reference")]
    pub theme_preference: String,
    pub time_zone: String,
    pub language: String,
    #[serde(rename = "task_reminder_inter")]
    pub task_reminder_interval_minutes: i64,
    pub work_start_time: String,
    pub work_end_time: String,
    pub work_days: String,
}

/// Schemas for every route that validates its body.
#[derive(Debug)]
pub struct RouteSchemas {
    pub signup: Arc<Schema>,
    pub login: Arc<Schema>,
    pub google_login: Arc<Schema>,
    pub google_callback: Arc<Schema>,
    pub logout: Arc<Schema>,
    pub settings_update: Arc<Schema>,
}

impl RouteSchemas {
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self {
            signup: Arc::new(user_create_schema()?),
            login: Arc::new(login_schema()?),
            google_login: Arc::new(google_login_schema()?),
            google_callback: Arc::new(google_callback_schema()?),
            logout: Arc::new(Schema::empty()),
            settings_update: Arc::new(settings_update_schema()?),
        })
    }
}

pub fn user_create_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .field_tags("email", FieldType::Text, "required,email")
        .field_tags("password", FieldType::Text, "required,min=8")
        .field_tags("username", FieldType::Text, "required,min=3")
        .field_tags("first_name", FieldType::Text, "required,min=3")
        .build()
}

pub fn login_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .field_tags("identifier", FieldType::Text, "required")
        .field_tags("password", FieldType::Text, "required,min=8")
        .build()
}

pub fn google_login_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .field_tags("access_token", FieldType::Text, "required")
        .build()
}

pub fn google_callback_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .field_tags("code", FieldType::Text, "required")
        .field_tags("state", FieldType::Text, "")
        .build()
}

pub fn settings_update_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .field_tags("theme_reference", FieldType::Text, "")
        .field_tags("time_zone", FieldType::Text, "")
        .field_tags("language", FieldType::Text, "")
        .field_tags("task_reminder_inter", FieldType::Integer, "min=1")
        .field_tags("work_start_time", FieldType::Text, "")
        .field_tags("work_end_time", FieldType::Text, "")
        .field_tags("work_days", FieldType::Text, "")
        .build()
}
