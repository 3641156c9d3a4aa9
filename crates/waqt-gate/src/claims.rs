//! Verified token claims and the caller identity extracted from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the claim carrying the caller's subject identifier.
pub const SUBJECT_CLAIM: &str = "id";

/// Claim set recovered from a verified bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Caller identity from the `id` claim.
    ///
    /// Accepts a non-empty string or a number (rendered in decimal); any
    /// other shape does not identify a caller.
    pub fn subject(&self) -> Option<SubjectId> {
        match self.0.get(SUBJECT_CLAIM)? {
            Value::String(id) if !id.is_empty() => Some(SubjectId(id.clone())),
            Value::Number(id) => Some(SubjectId(id.to_string())),
            _ => None,
        }
    }
}

/// Verified identifier of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        match value {
            Value::Object(map) => Claims::new(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_string_subject() {
        let c = claims(json!({ "id": "user-42", "exp": 1 }));
        assert_eq!(c.subject(), Some(SubjectId::new("user-42")));
    }

    #[test]
    fn test_numeric_subject() {
        let c = claims(json!({ "id": 42 }));
        assert_eq!(c.subject().unwrap().as_str(), "42");
    }

    #[test]
    fn test_unusable_subjects() {
        assert_eq!(claims(json!({})).subject(), None);
        assert_eq!(claims(json!({ "id": "" })).subject(), None);
        assert_eq!(claims(json!({ "id": null })).subject(), None);
        assert_eq!(claims(json!({ "id": ["a"] })).subject(), None);
        assert_eq!(claims(json!({ "sub": "user-1" })).subject(), None);
    }
}
