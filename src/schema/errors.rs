//! Schema configuration errors
//!
//! These describe problems with the schemas themselves, never with the
//! documents being validated. Document problems are reported as
//! [`SchemaFinding`](super::SchemaFinding)s.
//!
//! Error codes:
//! - SPLIT_SCHEMA_MALFORMED
//! - SPLIT_UNKNOWN_SCHEMA
//! - SPLIT_SCHEMA_DUPLICATE

use std::fmt;

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema file unreadable, not JSON, or structurally invalid
    SplitSchemaMalformed,
    /// Requested schema id has not been loaded
    SplitUnknownSchema,
    /// Schema id registered twice
    SplitSchemaDuplicate,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SplitSchemaMalformed => "SPLIT_SCHEMA_MALFORMED",
            SchemaErrorCode::SplitUnknownSchema => "SPLIT_UNKNOWN_SCHEMA",
            SchemaErrorCode::SplitSchemaDuplicate => "SPLIT_SCHEMA_DUPLICATE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema_id: Option<String>,
}

impl SchemaError {
    /// Schema file or definition could not be used
    pub fn malformed_schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SplitSchemaMalformed,
            message: format!("Malformed schema '{}': {}", location.into(), reason.into()),
            schema_id: None,
        }
    }

    /// Schema id not loaded
    pub fn unknown_schema(schema_id: impl Into<String>) -> Self {
        let id = schema_id.into();
        Self {
            code: SchemaErrorCode::SplitUnknownSchema,
            message: format!("Schema '{}' not found", id),
            schema_id: Some(id),
        }
    }

    /// Schema id already registered
    pub fn duplicate_schema(schema_id: impl Into<String>) -> Self {
        let id = schema_id.into();
        Self {
            code: SchemaErrorCode::SplitSchemaDuplicate,
            message: format!("Schema '{}' is already registered", id),
            schema_id: Some(id),
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
