//! Applying a [`Schema`] to a request body.

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::error::ValidationError;
use crate::schema::{Constraint, FieldRule, FieldType, Schema};

/// Decoded value of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl FieldValue {
    /// Zero value of a field type, used when the field is absent or null.
    pub fn zero(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => Self::Text(String::new()),
            FieldType::Integer => Self::Integer(0),
            FieldType::Number => Self::Number(0.0),
            FieldType::Boolean => Self::Boolean(false),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Integer(n) => *n == 0,
            Self::Number(n) => *n == 0.0,
            Self::Boolean(b) => !b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::from(s.as_str()),
            Self::Integer(n) => Value::from(*n),
            Self::Number(n) => Value::from(*n),
            Self::Boolean(b) => Value::from(*b),
        }
    }

    /// Quantity compared against `min`/`max`: character count for text.
    fn magnitude(&self) -> Option<f64> {
        match self {
            Self::Text(s) => Some(s.chars().count() as f64),
            Self::Integer(n) => Some(*n as f64),
            Self::Number(n) => Some(*n),
            Self::Boolean(_) => None,
        }
    }

    fn decode(rule: &FieldRule, value: Value) -> Result<Self, ValidationError> {
        let mismatch = || {
            ValidationError::malformed(format!(
                "field `{}` must be {}",
                rule.name(),
                rule.field_type().name()
            ))
        };
        match (rule.field_type(), value) {
            (field_type, Value::Null) => Ok(Self::zero(field_type)),
            (FieldType::Text, Value::String(s)) => Ok(Self::Text(s)),
            (FieldType::Integer, Value::Number(n)) => n.as_i64().map(Self::Integer).ok_or_else(mismatch),
            (FieldType::Number, Value::Number(n)) => n.as_f64().map(Self::Number).ok_or_else(mismatch),
            (FieldType::Boolean, Value::Bool(b)) => Ok(Self::Boolean(b)),
            _ => Err(mismatch()),
        }
    }
}

/// Body that passed its route's schema.
///
/// Holds exactly the declared fields, in declaration order; absent fields
/// carry their zero value and undeclared fields are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedBody {
    fields: Vec<(String, FieldValue)>,
}

impl ValidatedBody {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Text value of a field, if declared as text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Convert into a handler-specific request type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

impl Serialize for ValidatedBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}

impl Schema {
    /// Decode a JSON body and check every declared constraint.
    ///
    /// Decoding problems (bad syntax, a non-object body, a field of the wrong
    /// JSON type) yield [`ValidationError::MalformedBody`]. Otherwise each
    /// field reports its first failing constraint, and all such messages are
    /// returned together in declaration order.
    pub fn validate(&self, body: &[u8]) -> Result<ValidatedBody, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| ValidationError::malformed(err.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(ValidationError::malformed("expected a JSON object"));
        };

        // Fresh zero-valued instance for this request, filled from the body.
        let mut fields = Vec::with_capacity(self.fields().len());
        for rule in self.fields() {
            let value = match object.remove(rule.name()) {
                Some(value) => FieldValue::decode(rule, value)?,
                None => FieldValue::zero(rule.field_type()),
            };
            fields.push((rule.name().to_string(), value));
        }

        let messages: Vec<String> = self
            .fields()
            .iter()
            .zip(&fields)
            .filter_map(|(rule, (_, value))| {
                rule.constraints()
                    .iter()
                    .find(|constraint| !is_satisfied(constraint, value))
                    .map(|constraint| failure_message(rule.name(), constraint))
            })
            .collect();

        if messages.is_empty() {
            Ok(ValidatedBody { fields })
        } else {
            Err(ValidationError::FieldValidationFailed(messages))
        }
    }
}

fn is_satisfied(constraint: &Constraint, value: &FieldValue) -> bool {
    match constraint {
        Constraint::Required => !value.is_zero(),
        Constraint::Email => value.as_str().is_some_and(|s| s.validate_email()),
        Constraint::Min(min) => value.magnitude().is_some_and(|m| m >= *min),
        Constraint::Max(max) => value.magnitude().is_some_and(|m| m <= *max),
        Constraint::Custom(rule) => rule.check(value),
        Constraint::Unrecognized(_) => false,
    }
}

fn failure_message(field: &str, constraint: &Constraint) -> String {
    match constraint {
        Constraint::Required => format!("{field} is required"),
        Constraint::Email => format!("{field} must be a valid email address"),
        Constraint::Min(min) => format!("{field} must be at least {min}"),
        Constraint::Max(max) => format!("{field} must be at most {max}"),
        other => format!("{field} failed {} validation", other.tag()),
    }
}
