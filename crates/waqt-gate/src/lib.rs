//! # Waqt Gate
//!
//! Request gates that run before every Waqt API handler.
//!
//! ## Overview
//!
//! - **Authentication**: [`Authenticator`] verifies HMAC-signed bearer tokens,
//!   honours path exclusions and yields the caller's [`SubjectId`]
//! - **Schema validation**: a route-bound [`Schema`] decodes a JSON body into
//!   a [`ValidatedBody`], collecting every violated constraint
//! - **Request context**: [`RequestContext`] carries both results from the
//!   gates to the handler for one request only
//!
//! The crate has no web framework dependency; the API crate wires these
//! pieces into middleware.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use waqt_gate::{Authenticator, AuthOutcome, ExclusionList, FieldType, Schema, SigningSecret};
//!
//! let gate = Authenticator::new(SigningSecret::new("secret")?)
//!     .with_exclusions(ExclusionList::new(["/login"]));
//!
//! match gate.authenticate("/me", Some("Bearer eyJ..."))? {
//!     AuthOutcome::Authenticated(id) => println!("caller {id}"),
//!     AuthOutcome::Excluded => {}
//! }
//!
//! let schema = Schema::builder()
//!     .field_tags("email", FieldType::Text, "required,email")
//!     .build()?;
//! let body = schema.validate(br#"{"email":"a@b.com"}"#)?;
//! ```

pub mod authenticator;
pub mod claims;
pub mod context;
pub mod error;
pub mod exclusion;
pub mod schema;
pub mod secret;
pub mod validate;

// Primary exports
pub use authenticator::{AuthOutcome, Authenticator};
pub use claims::{Claims, SubjectId};
pub use context::RequestContext;
pub use error::{AuthError, EmptySecret, SchemaError, ValidationError};
pub use exclusion::ExclusionList;
pub use schema::{Constraint, FieldType, Schema, SchemaBuilder};
pub use secret::SigningSecret;
pub use validate::{FieldValue, ValidatedBody};
