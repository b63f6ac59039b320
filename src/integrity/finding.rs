//! Findings and reports
//!
//! A finding is a reported problem, never a thrown error. Reports are
//! serializable so the CLI can print them as JSON.

use std::fmt;

use serde::Serialize;

/// Category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    /// File content is not JSON; no further checks ran on it
    MalformedInput,
    /// Structural, type or format nonconformance with the schema
    SchemaViolation,
    /// `year` field differs from the year in the file name
    YearMismatch,
    /// An entry's date lies outside the file's year
    DateYearMismatch,
    InvalidRatioFormat,
    InvalidIsinFormat,
    /// `(symbol, date)` seen before, in this or an earlier file
    DuplicateSplit,
    /// `count` differs from the number of splits
    CountMismatch,
}

impl FindingKind {
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::MalformedInput => "MALFORMED_INPUT",
            FindingKind::SchemaViolation => "SCHEMA_VIOLATION",
            FindingKind::YearMismatch => "YEAR_MISMATCH",
            FindingKind::DateYearMismatch => "DATE_YEAR_MISMATCH",
            FindingKind::InvalidRatioFormat => "INVALID_RATIO_FORMAT",
            FindingKind::InvalidIsinFormat => "INVALID_ISIN_FORMAT",
            FindingKind::DuplicateSplit => "DUPLICATE_SPLIT",
            FindingKind::CountMismatch => "COUNT_MISMATCH",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One reported problem with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Path inside the document, e.g. `splits[2].ratio`
    pub location: String,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Validation result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub valid: bool,
    pub findings: Vec<Finding>,
}

impl FileReport {
    pub fn new(file: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            file: file.into(),
            valid: findings.is_empty(),
            findings,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn count_of(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    pub fn has(&self, kind: FindingKind) -> bool {
        self.count_of(kind) > 0
    }
}

/// Validation result for the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// One report per year file, in processing order
    pub files: Vec<FileReport>,
    /// Present when the index was checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<FileReport>,
}

impl IntegrityReport {
    /// True iff any file, or the index, has findings.
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|f| !f.valid) || self.index.as_ref().map_or(false, |i| !i.valid)
    }

    pub fn file(&self, name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.file == name)
    }

    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum::<usize>()
            + self.index.as_ref().map_or(0, |i| i.findings.len())
    }

    pub fn invalid_file_count(&self) -> usize {
        self.files.iter().filter(|f| !f.valid).count()
            + usize::from(self.index.as_ref().map_or(false, |i| !i.valid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_report_validity_follows_findings() {
        assert!(FileReport::new("2024.json", vec![]).is_valid());

        let report = FileReport::new(
            "2024.json",
            vec![Finding::new(FindingKind::CountMismatch, "count", "declared 2, actual 1")],
        );
        assert!(!report.is_valid());
        assert!(report.has(FindingKind::CountMismatch));
        assert_eq!(report.count_of(FindingKind::DuplicateSplit), 0);
    }

    #[test]
    fn test_report_has_errors_includes_index() {
        let mut report = IntegrityReport {
            files: vec![FileReport::new("2024.json", vec![])],
            index: None,
        };
        assert!(!report.has_errors());

        report.index = Some(FileReport::new(
            "index.json",
            vec![Finding::new(FindingKind::SchemaViolation, "years", "expected array, got int")],
        ));
        assert!(report.has_errors());
        assert_eq!(report.finding_count(), 1);
        assert_eq!(report.invalid_file_count(), 1);
    }

    #[test]
    fn test_finding_serializes_kind_code() {
        let finding = Finding::new(FindingKind::DuplicateSplit, "splits[1]", "dup");
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["kind"], "DUPLICATE_SPLIT");
        assert_eq!(
            format!("{}", finding),
            "[DUPLICATE_SPLIT] splits[1]: dup"
        );
    }
}
