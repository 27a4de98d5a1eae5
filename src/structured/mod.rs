//! Structured output validation.
//!
//! Turns raw generator text into validated data in three steps:
//! 1. strip a surrounding code fence if the generator echoed one ([`strip_fences`]),
//! 2. parse the remainder as JSON (failure is a *malformed payload* error),
//! 3. check field presence, types and constraints against a schema
//!    (failure is a *schema violation* naming the field and constraint).
//!
//! # Examples
//!
//! ```
//! use ai_report_rust::structured::{OutputValidator, parse_json_payload};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! });
//!
//! let validator = OutputValidator::new(&schema);
//! let data = parse_json_payload("```json\n{\"name\": \"Alice\"}\n```").unwrap();
//! assert!(validator.validate(data).is_valid());
//! ```

pub mod error;
pub mod payload;
pub mod schema;
pub mod validator;

mod schema_validator;

pub use error::{ValidationError, ValidationErrorKind, ValidationResult};
pub use payload::{parse_json_payload, strip_fences};
pub use schema::SchemaGenerator;
pub use schema_validator::SchemaValidator;
pub use validator::OutputValidator;
