//! Request schemas and typed request bodies

pub mod requests;

pub use requests::{
    GoogleCallbackRequest, GoogleLoginRequest, LoginRequest, RouteSchemas, SettingsUpdateRequest,
    UserCreateRequest,
};
