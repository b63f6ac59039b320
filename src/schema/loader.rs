//! Schema loader for reading schemas from disk at startup
//!
//! - Schemas stored at `<schema_dir>/<name>.schema.json`
//! - One file per schema id
//! - Malformed schema files or dangling references fail the load
//! - A missing schema directory falls back to the schemas shipped with the crate

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// Schema id for a single split entry
pub const SPLIT_ENTRY_SCHEMA: &str = "split-entry";
/// Schema id for a year file
pub const YEAR_FILE_SCHEMA: &str = "year-file";
/// Schema id for the aggregated index
pub const INDEX_SCHEMA: &str = "index";

const BUILTIN_SCHEMAS: [(&str, &str); 3] = [
    (
        "split-entry.schema.json",
        include_str!("../../schema/split-entry.schema.json"),
    ),
    (
        "year-file.schema.json",
        include_str!("../../schema/year-file.schema.json"),
    ),
    (
        "index.schema.json",
        include_str!("../../schema/index.schema.json"),
    ),
];

/// Schema registry with compiled patterns.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by schema_id
    schemas: HashMap<String, Schema>,
    /// Compiled regexes keyed by their source pattern
    patterns: HashMap<String, Regex>,
}

impl SchemaLoader {
    /// Creates an empty loader for `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
            patterns: HashMap::new(),
        }
    }

    /// Creates a loader holding only the schemas shipped with the crate.
    pub fn builtin() -> SchemaResult<Self> {
        let mut loader = Self::new(Path::new("<builtin>"));
        loader.load_builtin()?;
        Ok(loader)
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads all `*.json` files from the schema directory in name order.
    ///
    /// If the directory does not exist, the built-in schemas are loaded
    /// instead. Returns true when the built-ins were used.
    pub fn load_all(&mut self) -> SchemaResult<bool> {
        if !self.schema_dir.exists() {
            self.load_builtin()?;
            return Ok(true);
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_schema_file(&path)?;
        }

        self.verify_references()?;
        Ok(false)
    }

    fn load_builtin(&mut self) -> SchemaResult<()> {
        for (name, content) in BUILTIN_SCHEMAS {
            self.load_schema_str(name, content)?;
        }
        self.verify_references()
    }

    /// Loads a single schema file.
    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;
        self.load_schema_str(&path.display().to_string(), &content)
    }

    fn load_schema_str(&mut self, location: &str, content: &str) -> SchemaResult<()> {
        let schema: Schema = serde_json::from_str(content).map_err(|e| {
            SchemaError::malformed_schema(location, format!("Invalid JSON: {}", e))
        })?;
        self.register(schema)
    }

    /// Registers a schema directly (for testing or programmatic creation).
    ///
    /// Every pattern in the schema is compiled here, so validation never
    /// meets an invalid regex.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema(&schema.schema_id, e))?;

        if self.schemas.contains_key(&schema.schema_id) {
            return Err(SchemaError::duplicate_schema(&schema.schema_id));
        }

        for pattern in schema.patterns() {
            if self.patterns.contains_key(pattern) {
                continue;
            }
            let regex = Regex::new(pattern).map_err(|e| {
                SchemaError::malformed_schema(
                    &schema.schema_id,
                    format!("Invalid pattern '{}': {}", pattern, e),
                )
            })?;
            self.patterns.insert(pattern.to_string(), regex);
        }

        self.schemas.insert(schema.schema_id.clone(), schema);
        Ok(())
    }

    /// Fails if any loaded schema refers to a schema id that is not loaded.
    pub fn verify_references(&self) -> SchemaResult<()> {
        let mut ids: Vec<&String> = self.schemas.keys().collect();
        ids.sort();
        for id in ids {
            for reference in self.schemas[id].references() {
                if !self.schemas.contains_key(reference) {
                    return Err(SchemaError::malformed_schema(
                        id.as_str(),
                        format!("Reference to unknown schema '{}'", reference),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Gets a schema by id.
    pub fn get(&self, schema_id: &str) -> Option<&Schema> {
        self.schemas.get(schema_id)
    }

    /// Gets a schema by id or fails with `SPLIT_UNKNOWN_SCHEMA`.
    pub fn require(&self, schema_id: &str) -> SchemaResult<&Schema> {
        self.get(schema_id)
            .ok_or_else(|| SchemaError::unknown_schema(schema_id))
    }

    /// Checks if a schema exists.
    pub fn exists(&self, schema_id: &str) -> bool {
        self.schemas.contains_key(schema_id)
    }

    /// Compiled form of a pattern declared by a registered schema.
    pub fn pattern(&self, pattern: &str) -> Option<&Regex> {
        self.patterns.get(pattern)
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
