//! Rejection types produced by the request gates.

/// Reasons the authentication gate rejects a request.
///
/// All variants are client errors; none of them is retried by the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("Missing authorization token")]
    MissingToken,

    /// The token declares a non-HMAC signing algorithm.
    #[error("Unsupported signing method: {0}")]
    UnsupportedSigningMethod(String),

    /// Malformed token, bad signature, or expired / not-yet-valid claims.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// Token verified but its claims do not identify a caller.
    #[error("Unauthorized")]
    Unauthorized,
}

impl AuthError {
    /// Message returned to the client in the `error` field.
    ///
    /// The algorithm check is part of verification, so an unsupported
    /// algorithm is indistinguishable from a bad signature to the caller.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Missing authorization token",
            Self::UnsupportedSigningMethod(_) | Self::InvalidOrExpiredToken => {
                "Invalid or expired token"
            }
            Self::Unauthorized => "Unauthorized",
        }
    }
}

/// Reasons the schema validation gate rejects a request body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The body is not a JSON object matching the declared field types.
    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    /// The body decoded but violated one or more field constraints.
    #[error("Field validation failed: {}", .0.join("; "))]
    FieldValidationFailed(Vec<String>),
}

impl ValidationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedBody(reason.into())
    }
}

/// Errors raised while declaring a schema at route registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("field `{field}`: `{tag}` needs a numeric parameter, got `{param}`")]
    InvalidParameter {
        field: String,
        tag: String,
        param: String,
    },

    #[error("field `{field}`: `{tag}` cannot apply to a {field_type} field")]
    IncompatibleConstraint {
        field: String,
        tag: String,
        field_type: &'static str,
    },
}

/// The signing secret was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("signing secret must not be empty")]
pub struct EmptySecret;
