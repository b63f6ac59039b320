//! Raw file contents as handed to the integrity checker
//!
//! A file that is not JSON at all is still a `SourceFile`; it carries the
//! parse failure so the checker can report it and move on to the next file.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{year_from_file_name, YearFile};

/// Parsed form of a file's text.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Parsed(Value),
    /// Not parseable as JSON; holds the parser message
    Malformed(String),
}

/// A named input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Identifying name, e.g. `2024.json`
    pub name: String,
    pub document: Document,
}

impl SourceFile {
    /// Parses `text` as JSON, keeping a parse failure as `Document::Malformed`.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::from_bytes(name, text.as_bytes())
    }

    /// Like [`from_text`](Self::from_text) for raw file bytes. Bytes that are
    /// not UTF-8 are a parse failure, not an error.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let document = match serde_json::from_slice(bytes) {
            Ok(value) => Document::Parsed(value),
            Err(e) => Document::Malformed(e.to_string()),
        };
        Self {
            name: name.into(),
            document,
        }
    }

    pub fn from_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            document: Document::Parsed(value),
        }
    }

    /// Year encoded in the file name, if the name has the `NNNN.json` shape.
    pub fn name_year(&self) -> Option<i32> {
        year_from_file_name(&self.name)
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.document {
            Document::Parsed(value) => Some(value),
            Document::Malformed(_) => None,
        }
    }

    /// Decodes the document as a typed year file.
    pub fn to_year_file(&self) -> Result<YearFile, String> {
        match &self.document {
            Document::Parsed(value) => YearFile::deserialize(value).map_err(|e| e.to_string()),
            Document::Malformed(reason) => Err(reason.clone()),
        }
    }
}
