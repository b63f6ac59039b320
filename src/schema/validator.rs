//! Schema validator for documents
//!
//! Validation semantics:
//! - All required fields are present
//! - No undeclared fields exist
//! - Field types exactly match schema types
//! - Null is never a value
//! - String patterns, formats and lengths hold
//!
//! Unlike a fail-fast validator, every violation in the document is collected
//! in a single pass. Findings are produced in a deterministic order: within an
//! object, undeclared fields first, then declared fields by name.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::errors::SchemaResult;
use super::loader::SchemaLoader;
use super::types::{FieldDef, FieldType, StringFormat};
use crate::model::is_iso_date;

/// Path used for the document root
pub const ROOT_PATH: &str = "$root";

/// What was wrong at a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingField,
    UndeclaredField,
    NullValue,
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    PatternMismatch {
        pattern: String,
        actual: String,
    },
    InvalidFormat {
        format: StringFormat,
        actual: String,
    },
    TooShort {
        min_length: usize,
        actual: usize,
    },
    BelowMinimum {
        minimum: i64,
        actual: i64,
    },
    InvalidKey {
        pattern: String,
        key: String,
    },
    UnknownReference {
        schema_id: String,
    },
}

impl Violation {
    /// True for violations of a string `pattern` constraint.
    pub fn is_pattern_mismatch(&self) -> bool {
        matches!(self, Violation::PatternMismatch { .. })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField => write!(f, "required field is missing"),
            Violation::UndeclaredField => write!(f, "field is not declared by the schema"),
            Violation::NullValue => write!(f, "null is not allowed"),
            Violation::TypeMismatch { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
            Violation::PatternMismatch { pattern, actual } => {
                write!(f, "'{}' does not match pattern {}", actual, pattern)
            }
            Violation::InvalidFormat { format, actual } => {
                write!(f, "'{}' is not a valid {}", actual, format)
            }
            Violation::TooShort { min_length, actual } => write!(
                f,
                "must be at least {} characters, got {}",
                min_length, actual
            ),
            Violation::BelowMinimum { minimum, actual } => {
                write!(f, "must be >= {}, got {}", minimum, actual)
            }
            Violation::InvalidKey { pattern, key } => {
                write!(f, "key '{}' does not match pattern {}", key, pattern)
            }
            Violation::UnknownReference { schema_id } => {
                write!(f, "references unknown schema '{}'", schema_id)
            }
        }
    }
}

/// A single schema violation with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFinding {
    /// Field path (e.g., "splits[3].ratio")
    pub path: String,
    pub violation: Violation,
}

impl SchemaFinding {
    fn new(path: impl Into<String>, violation: Violation) -> Self {
        Self {
            path: path.into(),
            violation,
        }
    }
}

impl fmt::Display for SchemaFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.violation)
    }
}

/// Schema validator that collects every violation in a document.
///
/// Validator does not mutate documents.
/// Validation is deterministic.
pub struct SchemaValidator<'a> {
    loader: &'a SchemaLoader,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator backed by the given schema loader.
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self { loader }
    }

    /// Validates a document against a schema.
    ///
    /// Returns every finding; an empty vector means the document is valid.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` only if `schema_id` is not loaded
    /// (SPLIT_UNKNOWN_SCHEMA). Problems with the document are never errors.
    pub fn validate(&self, schema_id: &str, document: &Value) -> SchemaResult<Vec<SchemaFinding>> {
        let schema = self.loader.require(schema_id)?;
        let mut findings = Vec::new();

        match document.as_object() {
            Some(obj) => self.validate_object(obj, &schema.fields, "", &mut findings),
            None => findings.push(type_finding(ROOT_PATH, "object", document)),
        }

        Ok(findings)
    }

    /// Validates an object against field definitions.
    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &BTreeMap<String, FieldDef>,
        path_prefix: &str,
        findings: &mut Vec<SchemaFinding>,
    ) {
        for key in obj.keys() {
            if !fields.contains_key(key) {
                findings.push(SchemaFinding::new(
                    make_path(path_prefix, key),
                    Violation::UndeclaredField,
                ));
            }
        }

        for (field_name, field_def) in fields {
            let field_path = make_path(path_prefix, field_name);

            match obj.get(field_name) {
                Some(Value::Null) => {
                    findings.push(SchemaFinding::new(field_path, Violation::NullValue));
                }
                Some(value) => {
                    self.validate_value(value, &field_def.field_type, &field_path, findings);
                }
                None if field_def.required => {
                    findings.push(SchemaFinding::new(field_path, Violation::MissingField));
                }
                None => {}
            }
        }
    }

    /// Validates a value against a field type.
    fn validate_value(
        &self,
        value: &Value,
        expected_type: &FieldType,
        field_path: &str,
        findings: &mut Vec<SchemaFinding>,
    ) {
        match expected_type {
            FieldType::String {
                pattern,
                format,
                min_length,
            } => {
                let Some(s) = value.as_str() else {
                    findings.push(type_finding(field_path, "string", value));
                    return;
                };
                if let Some(min) = min_length {
                    let len = s.chars().count();
                    if len < *min {
                        findings.push(SchemaFinding::new(
                            field_path,
                            Violation::TooShort {
                                min_length: *min,
                                actual: len,
                            },
                        ));
                    }
                }
                if let Some(pattern) = pattern {
                    if !self.matches(pattern, s) {
                        findings.push(SchemaFinding::new(
                            field_path,
                            Violation::PatternMismatch {
                                pattern: pattern.clone(),
                                actual: s.to_string(),
                            },
                        ));
                    }
                }
                if let Some(format) = format {
                    if !format_holds(*format, s) {
                        findings.push(SchemaFinding::new(
                            field_path,
                            Violation::InvalidFormat {
                                format: *format,
                                actual: s.to_string(),
                            },
                        ));
                    }
                }
            }
            FieldType::Int { minimum } => {
                let Some(n) = value.as_i64() else {
                    findings.push(type_finding(field_path, "int", value));
                    return;
                };
                if let Some(min) = minimum {
                    if n < *min {
                        findings.push(SchemaFinding::new(
                            field_path,
                            Violation::BelowMinimum {
                                minimum: *min,
                                actual: n,
                            },
                        ));
                    }
                }
            }
            FieldType::Bool => {
                if !value.is_boolean() {
                    findings.push(type_finding(field_path, "bool", value));
                }
            }
            FieldType::Float => {
                // Accept both integers and floats as float
                if !value.is_number() {
                    findings.push(type_finding(field_path, "float", value));
                }
            }
            FieldType::Object { fields } => match value.as_object() {
                Some(obj) => self.validate_object(obj, fields, field_path, findings),
                None => findings.push(type_finding(field_path, "object", value)),
            },
            FieldType::Array { element_type } => {
                let Some(arr) = value.as_array() else {
                    findings.push(type_finding(field_path, "array", value));
                    return;
                };
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}[{}]", field_path, i);
                    if elem.is_null() {
                        findings.push(SchemaFinding::new(elem_path, Violation::NullValue));
                        continue;
                    }
                    self.validate_value(elem, element_type, &elem_path, findings);
                }
            }
            FieldType::Map {
                key_pattern,
                value_type,
            } => {
                let Some(obj) = value.as_object() else {
                    findings.push(type_finding(field_path, "object", value));
                    return;
                };
                for (key, entry) in obj {
                    let entry_path = make_path(field_path, key);
                    if let Some(pattern) = key_pattern {
                        if !self.matches(pattern, key) {
                            findings.push(SchemaFinding::new(
                                entry_path.clone(),
                                Violation::InvalidKey {
                                    pattern: pattern.clone(),
                                    key: key.clone(),
                                },
                            ));
                        }
                    }
                    if entry.is_null() {
                        findings.push(SchemaFinding::new(entry_path, Violation::NullValue));
                        continue;
                    }
                    self.validate_value(entry, value_type, &entry_path, findings);
                }
            }
            FieldType::Ref { schema_id } => match self.loader.get(schema_id) {
                Some(schema) => match value.as_object() {
                    Some(obj) => self.validate_object(obj, &schema.fields, field_path, findings),
                    None => findings.push(type_finding(field_path, "object", value)),
                },
                None => findings.push(SchemaFinding::new(
                    field_path,
                    Violation::UnknownReference {
                        schema_id: schema_id.clone(),
                    },
                )),
            },
        }
    }

    /// Patterns are compiled at registration; an unknown pattern never matches.
    fn matches(&self, pattern: &str, value: &str) -> bool {
        self.loader
            .pattern(pattern)
            .map_or(false, |re| re.is_match(value))
    }
}

fn format_holds(format: StringFormat, value: &str) -> bool {
    match format {
        StringFormat::Date => is_iso_date(value),
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn type_finding(field_path: &str, expected: &'static str, actual: &Value) -> SchemaFinding {
    SchemaFinding::new(
        field_path,
        Violation::TypeMismatch {
            expected,
            actual: json_type_name(actual),
        },
    )
}
