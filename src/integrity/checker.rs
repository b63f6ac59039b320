//! Dataset-wide integrity checking
//!
//! Files are processed in ascending name order. Names are zero-padded years,
//! so this is year order, and it decides which file is blamed for a
//! duplicate: the first file to declare a `(symbol, date)` is the original.
//!
//! The checker never fails on bad data. It only returns `Err` when a schema
//! it needs has not been loaded.

use std::collections::HashSet;

use serde_json::Value;

use super::finding::{FileReport, Finding, FindingKind, IntegrityReport};
use super::tracker::DuplicateTracker;
use crate::dataset::{Document, SourceFile};
use crate::model::{date_year, is_valid_isin, is_valid_ratio, IndexFile, SplitKey};
use crate::schema::{
    SchemaFinding, SchemaLoader, SchemaResult, SchemaValidator, INDEX_SCHEMA, ROOT_PATH,
    YEAR_FILE_SCHEMA,
};

pub struct IntegrityChecker<'a> {
    validator: SchemaValidator<'a>,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self {
            validator: SchemaValidator::new(loader),
        }
    }

    /// Checks every year file and, if given, the index.
    pub fn check_all(
        &self,
        year_files: &[SourceFile],
        index: Option<&SourceFile>,
    ) -> SchemaResult<IntegrityReport> {
        let mut report = self.check_dataset(year_files)?;
        if let Some(index) = index {
            report.index = Some(self.check_index(index)?);
        }
        Ok(report)
    }

    /// Checks all year files as one dataset.
    ///
    /// Input order does not matter; files are sorted by name first. The sort
    /// is stable, so files with equal names keep their input order.
    pub fn check_dataset(&self, year_files: &[SourceFile]) -> SchemaResult<IntegrityReport> {
        let mut ordered: Vec<&SourceFile> = year_files.iter().collect();
        ordered.sort_by(|a, b| a.name.cmp(&b.name));

        let mut tracker = DuplicateTracker::new();
        let mut files = Vec::with_capacity(ordered.len());
        for file in ordered {
            files.push(self.check_year_file(file, &mut tracker)?);
        }

        Ok(IntegrityReport { files, index: None })
    }

    /// Checks one year file, recording its keys in `tracker`.
    pub fn check_year_file(
        &self,
        file: &SourceFile,
        tracker: &mut DuplicateTracker,
    ) -> SchemaResult<FileReport> {
        let value = match &file.document {
            Document::Parsed(value) => value,
            Document::Malformed(reason) => return Ok(malformed(&file.name, reason)),
        };

        let schema_findings = self.validator.validate(YEAR_FILE_SCHEMA, value)?;

        let mut integrity = Vec::new();
        check_count(value, &mut integrity);
        check_year(file, value, &mut integrity);
        check_entries(file, value, tracker, &mut integrity);

        // A field already covered by a dedicated format check is not
        // reported a second time as a schema pattern mismatch.
        let mut findings: Vec<Finding> = {
            let covered: HashSet<&str> = integrity
                .iter()
                .filter(|f| {
                    matches!(
                        f.kind,
                        FindingKind::InvalidRatioFormat | FindingKind::InvalidIsinFormat
                    )
                })
                .map(|f| f.location.as_str())
                .collect();

            schema_findings
                .into_iter()
                .filter(|sf| {
                    !(sf.violation.is_pattern_mismatch() && covered.contains(sf.path.as_str()))
                })
                .map(schema_violation)
                .collect()
        };
        findings.extend(integrity);

        Ok(FileReport::new(&file.name, findings))
    }

    /// Checks an index file against the index schema.
    pub fn check_index(&self, file: &SourceFile) -> SchemaResult<FileReport> {
        match &file.document {
            Document::Parsed(value) => self.check_index_value(&file.name, value),
            Document::Malformed(reason) => Ok(malformed(&file.name, reason)),
        }
    }

    /// Checks a freshly built index before it is written.
    pub fn check_built_index(&self, name: &str, index: &IndexFile) -> SchemaResult<FileReport> {
        match serde_json::to_value(index) {
            Ok(value) => self.check_index_value(name, &value),
            Err(e) => Ok(malformed(name, &e.to_string())),
        }
    }

    fn check_index_value(&self, name: &str, value: &Value) -> SchemaResult<FileReport> {
        let findings = self
            .validator
            .validate(INDEX_SCHEMA, value)?
            .into_iter()
            .map(schema_violation)
            .collect();
        Ok(FileReport::new(name, findings))
    }
}

fn malformed(name: &str, reason: &str) -> FileReport {
    FileReport::new(
        name,
        vec![Finding::new(
            FindingKind::MalformedInput,
            ROOT_PATH,
            format!("Invalid JSON: {}", reason),
        )],
    )
}

fn schema_violation(finding: SchemaFinding) -> Finding {
    Finding::new(
        FindingKind::SchemaViolation,
        finding.path,
        finding.violation.to_string(),
    )
}

fn check_count(value: &Value, findings: &mut Vec<Finding>) {
    let declared = value.get("count").and_then(Value::as_i64);
    let splits = value.get("splits").and_then(Value::as_array);

    if let (Some(declared), Some(splits)) = (declared, splits) {
        if usize::try_from(declared).ok() != Some(splits.len()) {
            findings.push(Finding::new(
                FindingKind::CountMismatch,
                "count",
                format!(
                    "Count mismatch: declared {}, actual {}",
                    declared,
                    splits.len()
                ),
            ));
        }
    }
}

fn check_year(file: &SourceFile, value: &Value, findings: &mut Vec<Finding>) {
    let Some(name_year) = file.name_year() else {
        findings.push(Finding::new(
            FindingKind::YearMismatch,
            ROOT_PATH,
            format!("File name '{}' does not encode a year", file.name),
        ));
        return;
    };

    if let Some(declared) = value.get("year").and_then(Value::as_i64) {
        if declared != i64::from(name_year) {
            findings.push(Finding::new(
                FindingKind::YearMismatch,
                "year",
                format!(
                    "Year mismatch: file name says {}, data says {}",
                    name_year, declared
                ),
            ));
        }
    }
}

fn check_entries(
    file: &SourceFile,
    value: &Value,
    tracker: &mut DuplicateTracker,
    findings: &mut Vec<Finding>,
) {
    let Some(splits) = value.get("splits").and_then(Value::as_array) else {
        return;
    };
    let declared_year = value.get("year").and_then(Value::as_i64);

    for (i, entry) in splits.iter().enumerate() {
        // Non-object entries are a schema finding already
        let Some(entry) = entry.as_object() else {
            continue;
        };
        let path = format!("splits[{}]", i);
        let symbol = entry.get("symbol").and_then(Value::as_str);
        let date = entry.get("date").and_then(Value::as_str);
        let label = symbol.unwrap_or("<no symbol>");

        if let (Some(date), Some(year)) = (date, declared_year) {
            if let Some(entry_year) = date_year(date) {
                if i64::from(entry_year) != year {
                    findings.push(Finding::new(
                        FindingKind::DateYearMismatch,
                        format!("{}.date", path),
                        format!("Split {} date {} is not in year {}", label, date, year),
                    ));
                }
            }
        }

        if let Some(ratio) = entry.get("ratio").and_then(Value::as_str) {
            if !is_valid_ratio(ratio) {
                findings.push(Finding::new(
                    FindingKind::InvalidRatioFormat,
                    format!("{}.ratio", path),
                    format!("Invalid ratio format for {}: {}", label, ratio),
                ));
            }
        }

        if let Some(isin) = entry.get("isin").and_then(Value::as_str) {
            if !is_valid_isin(isin) {
                findings.push(Finding::new(
                    FindingKind::InvalidIsinFormat,
                    format!("{}.isin", path),
                    format!("Invalid ISIN format for {}: {}", label, isin),
                ));
            }
        }

        if let (Some(symbol), Some(date)) = (symbol, date) {
            if let Some(original) = tracker.observe(SplitKey::new(symbol, date), &file.name) {
                findings.push(Finding::new(
                    FindingKind::DuplicateSplit,
                    path,
                    format!(
                        "Duplicate split: {} on {} also in {}",
                        symbol, date, original
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(symbol: &str, date: &str, ratio: &str) -> Value {
        json!({ "symbol": symbol, "name": format!("{} Inc.", symbol), "date": date, "ratio": ratio })
    }

    fn year_file(name: &str, year: i64, splits: Vec<Value>) -> SourceFile {
        SourceFile::from_value(
            name,
            json!({
                "year": year,
                "updated": "2024-07-01",
                "count": splits.len(),
                "splits": splits
            }),
        )
    }

    fn check(files: &[SourceFile]) -> IntegrityReport {
        let loader = SchemaLoader::builtin().unwrap();
        IntegrityChecker::new(&loader).check_dataset(files).unwrap()
    }

    #[test]
    fn test_valid_dataset_has_no_findings() {
        let report = check(&[
            year_file("2023.json", 2023, vec![entry("XYZ", "2023-05-01", "2:1")]),
            year_file(
                "2024.json",
                2024,
                vec![entry("XYZ", "2024-05-01", "3:1"), entry("ABC", "2024-06-01", "1:10")],
            ),
        ]);
        assert!(!report.has_errors(), "{:#?}", report);
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn test_malformed_file_reported_and_others_checked() {
        let report = check(&[
            SourceFile::from_text("2023.json", "{ broken"),
            year_file("2024.json", 2024, vec![entry("XYZ", "2024-05-01", "2:1")]),
        ]);

        let broken = report.file("2023.json").unwrap();
        assert_eq!(broken.findings.len(), 1);
        assert_eq!(broken.findings[0].kind, FindingKind::MalformedInput);
        assert!(report.file("2024.json").unwrap().is_valid());
    }

    #[test]
    fn test_count_mismatch() {
        let file = SourceFile::from_value(
            "2024.json",
            json!({
                "year": 2024,
                "updated": "2024-07-01",
                "count": 3,
                "splits": [entry("XYZ", "2024-05-01", "2:1")]
            }),
        );
        let report = check(&[file]);
        let file = &report.files[0];
        assert_eq!(file.findings.len(), 1);
        assert_eq!(file.findings[0].kind, FindingKind::CountMismatch);
        assert!(file.findings[0].message.contains("declared 3, actual 1"));
    }

    #[test]
    fn test_year_mismatch_names_both_values() {
        let report = check(&[year_file(
            "2024.json",
            2023,
            vec![entry("XYZ", "2023-05-01", "2:1")],
        )]);
        let file = &report.files[0];
        assert_eq!(file.findings.len(), 1);
        assert_eq!(file.findings[0].kind, FindingKind::YearMismatch);
        assert!(file.findings[0].message.contains("2024"));
        assert!(file.findings[0].message.contains("2023"));
    }

    #[test]
    fn test_date_year_mismatch() {
        let report = check(&[year_file(
            "2024.json",
            2024,
            vec![entry("XYZ", "2023-12-31", "2:1")],
        )]);
        let file = &report.files[0];
        assert_eq!(file.findings.len(), 1);
        assert_eq!(file.findings[0].kind, FindingKind::DateYearMismatch);
        assert_eq!(file.findings[0].location, "splits[0].date");
    }

    #[test]
    fn test_wrong_ratio_separator_yields_exactly_one_finding() {
        let report = check(&[year_file(
            "2024.json",
            2024,
            vec![entry("XYZ", "2024-05-01", "3-1")],
        )]);
        let file = &report.files[0];
        assert_eq!(file.findings.len(), 1, "{:#?}", file.findings);
        assert_eq!(file.findings[0].kind, FindingKind::InvalidRatioFormat);
        assert_eq!(file.findings[0].location, "splits[0].ratio");
    }

    #[test]
    fn test_invalid_isin_yields_exactly_one_finding() {
        let mut bad = entry("XYZ", "2024-05-01", "2:1");
        bad["isin"] = json!("us123");
        let report = check(&[year_file("2024.json", 2024, vec![bad])]);
        let file = &report.files[0];
        assert_eq!(file.findings.len(), 1, "{:#?}", file.findings);
        assert_eq!(file.findings[0].kind, FindingKind::InvalidIsinFormat);
    }

    #[test]
    fn test_duplicate_within_one_file() {
        let file = SourceFile::from_value(
            "2024.json",
            json!({
                "count": 2,
                "splits": [
                    { "symbol": "ABC", "date": "2024-03-01", "ratio": "2:1" },
                    { "symbol": "ABC", "date": "2024-03-01", "ratio": "2:1" }
                ]
            }),
        );
        let report = check(&[file]);
        let file = &report.files[0];
        assert_eq!(file.count_of(FindingKind::DuplicateSplit), 1);
        let dup = file
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::DuplicateSplit)
            .unwrap();
        assert_eq!(dup.location, "splits[1]");
        assert!(dup.message.contains("also in 2024.json"));
    }

    #[test]
    fn test_duplicate_blames_later_file_regardless_of_input_order() {
        let report = check(&[
            year_file("2024.json", 2024, vec![entry("ABC", "2023-03-01", "2:1")]),
            year_file("2023.json", 2023, vec![entry("ABC", "2023-03-01", "2:1")]),
        ]);

        assert_eq!(report.files[0].file, "2023.json");
        assert!(report.files[0].is_valid());

        let later = report.file("2024.json").unwrap();
        assert_eq!(later.count_of(FindingKind::DuplicateSplit), 1);
        assert!(later.findings.iter().any(|f| f.message.contains("also in 2023.json")));
    }

    #[test]
    fn test_file_name_without_year() {
        let report = check(&[year_file("splits.json", 2024, vec![])]);
        assert!(report.files[0].has(FindingKind::YearMismatch));
    }

    #[test]
    fn test_check_built_index() {
        let loader = SchemaLoader::builtin().unwrap();
        let checker = IntegrityChecker::new(&loader);
        let index = IndexFile {
            schema_ref: None,
            version: "1.0.0".into(),
            updated: "2024-07-01".into(),
            total_splits: 0,
            years: vec![],
            by_symbol: Default::default(),
            by_isin: Default::default(),
        };
        assert!(checker.check_built_index("index.json", &index).unwrap().is_valid());

        let bad = IndexFile {
            version: "one".into(),
            ..index
        };
        let report = checker.check_built_index("index.json", &bad).unwrap();
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].location, "version");
    }
}
