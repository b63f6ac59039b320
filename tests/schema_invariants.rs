//! Schema Invariant Tests
//!
//! Tests for schema validation invariants:
//! - Validation collects every violation, not just the first
//! - Validation is deterministic
//! - Required fields must be present, undeclared fields are rejected
//! - Nulls are never accepted, not even for optional fields
//! - Shipped schema files load and agree with the builtin copies

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::json;
use splitdb::schema::{
    FieldDef, FieldType, Schema, SchemaErrorCode, SchemaLoader, SchemaValidator, Violation,
    INDEX_SCHEMA, SPLIT_ENTRY_SCHEMA, YEAR_FILE_SCHEMA,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn builtin() -> SchemaLoader {
    SchemaLoader::builtin().unwrap()
}

fn valid_entry() -> serde_json::Value {
    json!({
        "symbol": "NVDA",
        "name": "NVIDIA Corporation",
        "date": "2024-06-10",
        "ratio": "10:1",
        "isin": "US67066G1040",
        "exchange": "NASDAQ"
    })
}

// =============================================================================
// Loading Tests
// =============================================================================

/// The schema files in the repository load and cover all three documents.
#[test]
fn test_repository_schema_dir_loads() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("schema");
    let mut loader = SchemaLoader::new(&dir);

    let builtin_used = loader.load_all().unwrap();
    assert!(!builtin_used);
    assert!(loader.exists(SPLIT_ENTRY_SCHEMA));
    assert!(loader.exists(YEAR_FILE_SCHEMA));
    assert!(loader.exists(INDEX_SCHEMA));
}

/// The builtin copies are the repository's schema files.
#[test]
fn test_builtin_matches_repository_files() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("schema");
    let mut from_dir = SchemaLoader::new(&dir);
    from_dir.load_all().unwrap();
    let builtin = builtin();

    for id in [SPLIT_ENTRY_SCHEMA, YEAR_FILE_SCHEMA, INDEX_SCHEMA] {
        assert_eq!(from_dir.get(id), builtin.get(id), "schema {}", id);
    }
}

/// A missing schema directory falls back to the builtin schemas.
#[test]
fn test_missing_dir_uses_builtin() {
    let tmp = TempDir::new().unwrap();
    let mut loader = SchemaLoader::new(&tmp.path().join("absent"));

    assert!(loader.load_all().unwrap());
    assert_eq!(loader.schema_count(), 3);
}

/// Schema file that is not JSON is a hard error.
#[test]
fn test_malformed_schema_file_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("split-entry.schema.json"), "{ nope").unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    let err = loader.load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SplitSchemaMalformed);
}

/// A schema referencing an unregistered schema fails verification.
#[test]
fn test_dangling_reference_rejected() {
    let mut fields = BTreeMap::new();
    fields.insert(
        "items".to_string(),
        FieldDef::required_array(FieldType::Ref {
            schema_id: "nowhere".to_string(),
        }),
    );

    let mut loader = SchemaLoader::new(Path::new("unused"));
    loader.register(Schema::new("holder", "1.0.0", fields)).unwrap();

    let err = loader.verify_references().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SplitSchemaMalformed);
    assert!(err.message().contains("nowhere"));
}

/// Registering the same schema id twice is rejected.
#[test]
fn test_duplicate_schema_rejected() {
    let fields = || {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), FieldDef::required_string());
        fields
    };

    let mut loader = SchemaLoader::new(Path::new("unused"));
    loader.register(Schema::new("dup", "1.0.0", fields())).unwrap();

    let err = loader
        .register(Schema::new("dup", "1.0.1", fields()))
        .unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SplitSchemaDuplicate);
}

/// A schema without fields is malformed.
#[test]
fn test_empty_schema_rejected() {
    let mut loader = SchemaLoader::new(Path::new("unused"));
    let err = loader
        .register(Schema::new("empty", "1.0.0", BTreeMap::new()))
        .unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SplitSchemaMalformed);
}

// =============================================================================
// Validation Determinism Tests
// =============================================================================

/// Same document validates the same way every time.
#[test]
fn test_validation_is_deterministic() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let doc = json!({"symbol": "", "date": "June", "ratio": 2, "extra": true});

    let first = validator.validate(SPLIT_ENTRY_SCHEMA, &doc).unwrap();
    for _ in 0..50 {
        assert_eq!(validator.validate(SPLIT_ENTRY_SCHEMA, &doc).unwrap(), first);
    }
}

/// Every violation in a document is reported in one pass.
#[test]
fn test_all_violations_collected() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let doc = json!({"symbol": "", "date": "June", "ratio": 2, "extra": true});

    let findings = validator.validate(SPLIT_ENTRY_SCHEMA, &doc).unwrap();
    let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();

    assert!(paths.contains(&"extra"));
    assert!(paths.contains(&"symbol"));
    assert!(paths.contains(&"name"));
    assert!(paths.contains(&"date"));
    assert!(paths.contains(&"ratio"));
    assert_eq!(findings.len(), 5);
}

// =============================================================================
// Field Rule Tests
// =============================================================================

/// A fully populated entry conforms.
#[test]
fn test_valid_entry_conforms() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);

    assert!(validator
        .validate(SPLIT_ENTRY_SCHEMA, &valid_entry())
        .unwrap()
        .is_empty());
}

/// Null is rejected even for optional fields.
#[test]
fn test_null_optional_field_rejected() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let mut doc = valid_entry();
    doc["isin"] = json!(null);

    let findings = validator.validate(SPLIT_ENTRY_SCHEMA, &doc).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].path, "isin");
    assert_eq!(findings[0].violation, Violation::NullValue);
}

/// Numbers are not coerced to strings.
#[test]
fn test_no_type_coercion() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let mut doc = valid_entry();
    doc["verified"] = json!("true");

    let findings = validator.validate(SPLIT_ENTRY_SCHEMA, &doc).unwrap();
    assert_eq!(findings.len(), 1);
    assert!(matches!(
        findings[0].violation,
        Violation::TypeMismatch { expected: "bool", .. }
    ));
}

/// Calendar-invalid dates fail the date format even when the shape is right.
#[test]
fn test_impossible_date_rejected() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let mut doc = valid_entry();
    doc["date"] = json!("2023-02-30");

    let findings = validator.validate(SPLIT_ENTRY_SCHEMA, &doc).unwrap();
    assert_eq!(findings.len(), 1);
    assert!(matches!(findings[0].violation, Violation::InvalidFormat { .. }));
}

/// Nested split entries are reported with indexed paths.
#[test]
fn test_year_file_nested_paths() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let doc = json!({
        "year": 2024,
        "updated": "2024-07-01",
        "count": 2,
        "splits": [
            valid_entry(),
            {"symbol": "AAPL", "name": "Apple", "date": "2024-08-28", "ratio": "4-1"}
        ]
    });

    let findings = validator.validate(YEAR_FILE_SCHEMA, &doc).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].path, "splits[1].ratio");
    assert!(findings[0].violation.is_pattern_mismatch());
}

/// Index map keys must look like ISINs.
#[test]
fn test_index_isin_keys_checked() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);
    let doc = json!({
        "version": "1.0.0",
        "updated": "2024-07-01",
        "totalSplits": 0,
        "years": [],
        "bySymbol": {},
        "byIsin": {"not-an-isin": "NVDA"}
    });

    let findings = validator.validate(INDEX_SCHEMA, &doc).unwrap();
    assert_eq!(findings.len(), 1);
    assert!(matches!(findings[0].violation, Violation::InvalidKey { .. }));
}

/// Validating against an unknown schema id is an error, not a finding.
#[test]
fn test_unknown_schema_is_error() {
    let loader = builtin();
    let validator = SchemaValidator::new(&loader);

    let err = validator.validate("no-such-schema", &json!({})).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SplitUnknownSchema);
}
