//! Schema Validator subsystem
//!
//! Schemas are external configuration data: JSON files describing the
//! structure of split entries, year files and the index. The validator is a
//! pure function over a loaded schema and a JSON document.
//!
//! # Design Principles
//!
//! - Collect every violation, never stop at the first
//! - No nulls, defaults, or coercion
//! - No undeclared fields
//! - Deterministic finding order

mod errors;
mod loader;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{SchemaLoader, INDEX_SCHEMA, SPLIT_ENTRY_SCHEMA, YEAR_FILE_SCHEMA};
pub use types::{FieldDef, FieldType, Schema, StringFormat};
pub use validator::{SchemaFinding, SchemaValidator, Violation, ROOT_PATH};
