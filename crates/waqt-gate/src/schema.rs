//! Route-bound body schemas.
//!
//! A [`Schema`] is an ordered list of field rules declared once when a route
//! is registered and shared read-only by every request to that route. Each
//! rule names a JSON field, its [`FieldType`], and the [`Constraint`]s the
//! decoded value must satisfy.
//!
//! ```
//! use waqt_gate::schema::{Constraint, FieldType, Schema};
//!
//! let schema = Schema::builder()
//!     .field("email", FieldType::Text, [Constraint::Required, Constraint::Email])
//!     .field_tags("password", FieldType::Text, "required,min=8")
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.fields().len(), 2);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::validate::FieldValue;

/// Declared JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// A single rule applied to a decoded field value.
#[derive(Clone)]
pub enum Constraint {
    /// Value must not be the zero value of its type.
    Required,
    /// Text must have the shape of an email address.
    Email,
    /// Lower bound: character count for text, value for numbers.
    Min(f64),
    /// Upper bound: character count for text, value for numbers.
    Max(f64),
    /// Application-defined predicate.
    Custom(CustomRule),
    /// A tag the schema language does not know. Always fails, so a typo in a
    /// descriptor shows up in responses instead of silently passing.
    Unrecognized(String),
}

impl Constraint {
    /// Build a custom constraint from a tag name and a predicate.
    pub fn custom<F>(tag: impl Into<String>, check: F) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomRule {
            tag: tag.into(),
            check: Arc::new(check),
        })
    }

    /// Tag name as it appears in tag strings and generic failure messages.
    pub fn tag(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Custom(rule) => &rule.tag,
            Self::Unrecognized(tag) => tag,
        }
    }

    fn check_applies_to(&self, field: &str, field_type: FieldType) -> Result<(), SchemaError> {
        let applies = match self {
            Self::Email => field_type == FieldType::Text,
            Self::Min(_) | Self::Max(_) => field_type != FieldType::Boolean,
            _ => true,
        };
        if applies {
            Ok(())
        } else {
            Err(SchemaError::IncompatibleConstraint {
                field: field.to_string(),
                tag: self.tag().to_string(),
                field_type: field_type.name(),
            })
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Email => f.write_str("Email"),
            Self::Min(n) => write!(f, "Min({n})"),
            Self::Max(n) => write!(f, "Max({n})"),
            Self::Custom(rule) => write!(f, "Custom({:?})", rule.tag),
            Self::Unrecognized(tag) => write!(f, "Unrecognized({tag:?})"),
        }
    }
}

/// Named predicate used by [`Constraint::Custom`].
#[derive(Clone)]
pub struct CustomRule {
    tag: String,
    check: Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>,
}

impl CustomRule {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn check(&self, value: &FieldValue) -> bool {
        (self.check)(value)
    }
}

/// Rules for one named field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: String,
    field_type: FieldType,
    constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

/// Immutable, ordered set of field rules bound to one route.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldRule>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Schema with no fields: any JSON object passes and decodes to an
    /// empty value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }
}

/// Accumulates field rules; errors surface from [`SchemaBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldRule>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    pub fn field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Self {
        self.fields.push(FieldRule {
            name: name.into(),
            field_type,
            constraints: constraints.into_iter().collect(),
        });
        self
    }

    /// Declare a field from a comma-separated tag list such as
    /// `"required,min=8"`.
    pub fn field_tags(mut self, name: impl Into<String>, field_type: FieldType, tags: &str) -> Self {
        let name = name.into();
        match parse_tags(&name, tags) {
            Ok(constraints) => self.field(name, field_type, constraints),
            Err(err) => {
                self.error.get_or_insert(err);
                self
            }
        }
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut seen = HashSet::new();
        for rule in &self.fields {
            if !seen.insert(rule.name.as_str()) {
                return Err(SchemaError::DuplicateField(rule.name.clone()));
            }
            for constraint in &rule.constraints {
                constraint.check_applies_to(&rule.name, rule.field_type)?;
                if let Constraint::Unrecognized(tag) = constraint {
                    tracing::warn!(field = %rule.name, tag = %tag, "schema uses an unrecognized constraint tag");
                }
            }
        }

        Ok(Schema {
            fields: self.fields,
        })
    }
}

/// Parse a comma-separated tag list into constraints.
///
/// Known tags are `required`, `email`, `min=<n>` and `max=<n>`. Any other
/// tag becomes [`Constraint::Unrecognized`] carrying the tag name without
/// its parameter.
pub fn parse_tags(field: &str, tags: &str) -> Result<Vec<Constraint>, SchemaError> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| {
            let (name, param) = match tag.split_once('=') {
                Some((name, param)) => (name.trim(), Some(param.trim())),
                None => (tag, None),
            };
            match (name, param) {
                ("required", None) => Ok(Constraint::Required),
                ("email", None) => Ok(Constraint::Email),
                ("min", Some(param)) => bound(field, name, param).map(Constraint::Min),
                ("max", Some(param)) => bound(field, name, param).map(Constraint::Max),
                ("min" | "max", None) => Err(SchemaError::InvalidParameter {
                    field: field.to_string(),
                    tag: name.to_string(),
                    param: String::new(),
                }),
                (other, _) => Ok(Constraint::Unrecognized(other.to_string())),
            }
        })
        .collect()
}

fn bound(field: &str, tag: &str, param: &str) -> Result<f64, SchemaError> {
    param
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| SchemaError::InvalidParameter {
            field: field.to_string(),
            tag: tag.to_string(),
            param: param.to_string(),
        })
}
