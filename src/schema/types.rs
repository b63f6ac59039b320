//! Schema type definitions
//!
//! Supported types:
//! - string: UTF-8 string, optionally constrained by pattern, format, or length
//! - int: 64-bit signed integer, optionally bounded below
//! - bool: Boolean
//! - float: 64-bit floating point
//! - object: Nested object with field schema
//! - array: Homogeneous array with element type
//! - map: Object with arbitrary keys and a single value type
//! - ref: Another loaded schema, by id

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named string formats understood by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    /// Calendar date, `YYYY-MM-DD`
    Date,
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringFormat::Date => write!(f, "date (YYYY-MM-DD)"),
        }
    }
}

/// Field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<StringFormat>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
    },
    /// 64-bit signed integer
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
    },
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Nested object with its own field schema
    Object {
        fields: BTreeMap<String, FieldDef>,
    },
    /// Homogeneous array with single element type
    Array {
        element_type: Box<FieldType>,
    },
    /// Object used as a dictionary: any keys, one value type
    Map {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_pattern: Option<String>,
        value_type: Box<FieldType>,
    },
    /// Reference to another registered schema
    Ref {
        schema_id: String,
    },
}

impl FieldType {
    /// Unconstrained string
    pub fn string() -> Self {
        FieldType::String {
            pattern: None,
            format: None,
            min_length: None,
        }
    }

    /// String that must match `pattern`
    pub fn pattern(pattern: impl Into<String>) -> Self {
        FieldType::String {
            pattern: Some(pattern.into()),
            format: None,
            min_length: None,
        }
    }

    /// `YYYY-MM-DD` date string
    pub fn date() -> Self {
        FieldType::String {
            pattern: None,
            format: Some(StringFormat::Date),
            min_length: None,
        }
    }

    /// Unbounded integer
    pub fn int() -> Self {
        FieldType::Int { minimum: None }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String { .. } => "string",
            FieldType::Int { .. } => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
            FieldType::Map { .. } => "map",
            FieldType::Ref { .. } => "ref",
        }
    }

    /// Visits every regex pattern declared in this type, recursively.
    pub(crate) fn collect_patterns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldType::String {
                pattern: Some(p), ..
            } => out.push(p),
            FieldType::Object { fields } => {
                for def in fields.values() {
                    def.field_type.collect_patterns(out);
                }
            }
            FieldType::Array { element_type } => element_type.collect_patterns(out),
            FieldType::Map {
                key_pattern,
                value_type,
            } => {
                if let Some(p) = key_pattern {
                    out.push(p);
                }
                value_type.collect_patterns(out);
            }
            _ => {}
        }
    }

    /// Visits every schema id referenced from this type, recursively.
    pub(crate) fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldType::Ref { schema_id } => out.push(schema_id),
            FieldType::Object { fields } => {
                for def in fields.values() {
                    def.field_type.collect_refs(out);
                }
            }
            FieldType::Array { element_type } => element_type.collect_refs(out),
            FieldType::Map { value_type, .. } => value_type.collect_refs(out),
            _ => {}
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether field must be present
    pub required: bool,
}

impl FieldDef {
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
        }
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
        }
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::required(FieldType::string())
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self::optional(FieldType::string())
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self::required(FieldType::int())
    }

    /// Create an optional bool field
    pub fn optional_bool() -> Self {
        Self::optional(FieldType::Bool)
    }

    /// Create a required array field
    pub fn required_array(element_type: FieldType) -> Self {
        Self::required(FieldType::Array {
            element_type: Box::new(element_type),
        })
    }
}

/// Complete schema definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema identifier
    pub schema_id: String,
    /// Schema version (informational)
    pub schema_version: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions of the root object
    pub fields: BTreeMap<String, FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
        fields: BTreeMap<String, FieldDef>,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            description: None,
            fields,
        }
    }

    /// Validates the schema structure itself (not a document).
    ///
    /// Patterns are compiled separately by the loader.
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.schema_id.trim().is_empty() {
            return Err("schema_id must not be empty".into());
        }
        if self.fields.is_empty() {
            return Err(format!("Schema '{}' declares no fields", self.schema_id));
        }
        Ok(())
    }

    /// All regex patterns used anywhere in the schema.
    pub fn patterns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for def in self.fields.values() {
            def.field_type.collect_patterns(&mut out);
        }
        out
    }

    /// All schema ids this schema refers to.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for def in self.fields.values() {
            def.field_type.collect_refs(&mut out);
        }
        out
    }
}
