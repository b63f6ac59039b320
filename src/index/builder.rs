//! Index Builder
//!
//! Folds year files into one [`IndexFile`] through an explicit accumulator.
//!
//! # API
//!
//! - `IndexBuilder::build(files, updated)` - Full rebuild, no incremental merge
//! - `IndexBuilder::build_named(files, updated)` - Same, in file-name order
//! - `IndexAccumulator::absorb(file)` - One step of the fold
//! - `IndexAccumulator::finish(...)` - Sort, stamp, and emit

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{IndexFile, IndexedSplit, SplitEntry, SymbolData, YearFile};

/// Default index format version
pub const INDEX_FORMAT_VERSION: &str = "1.0.0";

/// Which entry supplies a symbol's `name`, `isin` and `exchange`.
///
/// `by_isin` is always last-writer-wins regardless of this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolMetadataPolicy {
    /// The first entry processed for a symbol seeds its metadata; later
    /// entries never change it.
    #[default]
    FirstSeen,
    /// Each later entry overwrites the metadata it provides. Absent optional
    /// fields do not clear earlier values.
    LastSeen,
}

/// Build parameters.
#[derive(Debug, Clone)]
pub struct IndexBuildOptions {
    pub version: String,
    /// `$schema` reference written into the index
    pub schema_ref: Option<String>,
    pub metadata_policy: SymbolMetadataPolicy,
}

impl Default for IndexBuildOptions {
    fn default() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION.to_string(),
            schema_ref: None,
            metadata_policy: SymbolMetadataPolicy::default(),
        }
    }
}

/// An ISIN that moved from one symbol to another during the fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsinReassignment {
    pub isin: String,
    pub previous_symbol: String,
    pub symbol: String,
    /// Year file in which the reassignment happened
    pub year: i32,
}

/// Counters and notable events from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub files: usize,
    pub symbols: usize,
    pub total_splits: usize,
    pub isin_reassignments: Vec<IsinReassignment>,
}

/// A built index together with what happened while building it.
#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub index: IndexFile,
    pub summary: BuildSummary,
}

/// Running state of the fold over year files.
#[derive(Debug, Default)]
pub struct IndexAccumulator {
    years: Vec<i32>,
    by_symbol: BTreeMap<String, SymbolData>,
    by_isin: BTreeMap<String, String>,
    total_splits: usize,
    files: usize,
    reassignments: Vec<IsinReassignment>,
}

impl IndexAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one year file into the accumulator.
    pub fn absorb(&mut self, file: &YearFile, policy: SymbolMetadataPolicy) {
        self.files += 1;
        self.years.push(file.year);

        for entry in &file.splits {
            self.absorb_entry(entry, file.year, policy);
        }
    }

    fn absorb_entry(&mut self, entry: &SplitEntry, year: i32, policy: SymbolMetadataPolicy) {
        self.total_splits += 1;

        let data = self
            .by_symbol
            .entry(entry.symbol.clone())
            .or_insert_with(|| SymbolData {
                name: entry.name.clone(),
                isin: entry.isin.clone(),
                exchange: entry.exchange.clone(),
                splits: Vec::new(),
            });

        if policy == SymbolMetadataPolicy::LastSeen {
            data.name = entry.name.clone();
            if entry.isin.is_some() {
                data.isin = entry.isin.clone();
            }
            if entry.exchange.is_some() {
                data.exchange = entry.exchange.clone();
            }
        }

        data.splits.push(IndexedSplit {
            date: entry.date.clone(),
            ratio: entry.ratio.clone(),
            notes: entry.notes.clone().filter(|n| !n.is_empty()),
        });

        if let Some(isin) = &entry.isin {
            let previous = self.by_isin.insert(isin.clone(), entry.symbol.clone());
            if let Some(previous) = previous {
                if previous != entry.symbol {
                    self.reassignments.push(IsinReassignment {
                        isin: isin.clone(),
                        previous_symbol: previous,
                        symbol: entry.symbol.clone(),
                        year,
                    });
                }
            }
        }
    }

    /// Sorts, stamps and emits the index.
    ///
    /// Each symbol's splits end up most recent first. The sort is stable, so
    /// splits sharing a date keep their processing order.
    pub fn finish(mut self, options: &IndexBuildOptions, updated: NaiveDate) -> IndexBuild {
        for data in self.by_symbol.values_mut() {
            data.splits.sort_by(|a, b| b.date.cmp(&a.date));
        }

        self.years.sort_unstable();
        self.years.dedup();

        let summary = BuildSummary {
            files: self.files,
            symbols: self.by_symbol.len(),
            total_splits: self.total_splits,
            isin_reassignments: self.reassignments,
        };

        let index = IndexFile {
            schema_ref: options.schema_ref.clone(),
            version: options.version.clone(),
            updated: updated.format("%Y-%m-%d").to_string(),
            total_splits: self.total_splits,
            years: self.years,
            by_symbol: self.by_symbol,
            by_isin: self.by_isin,
        };

        IndexBuild { index, summary }
    }
}

/// Builds the index from year files.
pub struct IndexBuilder {
    options: IndexBuildOptions,
}

impl IndexBuilder {
    pub fn new(options: IndexBuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexBuildOptions {
        &self.options
    }

    /// Full rebuild over `files`, processed in ascending year order.
    ///
    /// The result is deterministic for a fixed input, apart from `updated`.
    /// `totalSplits` counts the entries actually folded in; declared
    /// `count` fields are not consulted.
    pub fn build(&self, files: &[YearFile], updated: NaiveDate) -> IndexBuild {
        let mut ordered: Vec<&YearFile> = files.iter().collect();
        ordered.sort_by_key(|file| file.year);
        self.fold(ordered, updated)
    }

    /// Full rebuild over files read from disk, processed in file-name order.
    ///
    /// This is the order the integrity checker reports in, so `byIsin` and
    /// duplicate blame agree even when a file declares a year other than
    /// its name.
    pub fn build_named(&self, files: &[(String, YearFile)], updated: NaiveDate) -> IndexBuild {
        let mut ordered: Vec<&(String, YearFile)> = files.iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        self.fold(ordered.into_iter().map(|(_, file)| file), updated)
    }

    fn fold<'a>(
        &self,
        files: impl IntoIterator<Item = &'a YearFile>,
        updated: NaiveDate,
    ) -> IndexBuild {
        let accumulator = files
            .into_iter()
            .fold(IndexAccumulator::new(), |mut acc, file| {
                acc.absorb(file, self.options.metadata_policy);
                acc
            });

        accumulator.finish(&self.options, updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn entry(symbol: &str, date: &str, ratio: &str) -> SplitEntry {
        SplitEntry::new(symbol, format!("{} Inc.", symbol), date, ratio)
    }

    fn year(year: i32, splits: Vec<SplitEntry>) -> YearFile {
        let mut file = YearFile::new(year, day(), None);
        file.count = splits.len();
        file.splits = splits;
        file
    }

    fn build(files: &[YearFile]) -> IndexBuild {
        IndexBuilder::new(IndexBuildOptions::default()).build(files, day())
    }

    #[test]
    fn test_splits_most_recent_first() {
        let built = build(&[
            year(2020, vec![entry("AAPL", "2020-08-31", "4:1")]),
            year(2014, vec![entry("AAPL", "2014-06-09", "7:1")]),
        ]);

        let dates: Vec<_> = built.index.by_symbol["AAPL"]
            .splits
            .iter()
            .map(|s| s.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2020-08-31", "2014-06-09"]);
        assert_eq!(built.index.years, vec![2014, 2020]);
    }

    #[test]
    fn test_same_date_keeps_processing_order() {
        let mut first = entry("ABC", "2024-03-01", "2:1");
        first.notes = Some("first".into());
        let mut second = entry("ABC", "2024-03-01", "3:1");
        second.notes = Some("second".into());

        let built = build(&[year(2024, vec![first, second])]);
        let notes: Vec<_> = built.index.by_symbol["ABC"]
            .splits
            .iter()
            .map(|s| s.notes.as_deref().unwrap())
            .collect();
        assert_eq!(notes, vec!["first", "second"]);
    }

    #[test]
    fn test_first_seen_metadata_and_last_writer_isin() {
        let mut old = entry("XYZ", "2023-05-01", "2:1");
        old.isin = Some("US0000000001".into());
        let mut new = entry("XYZ", "2024-05-01", "2:1");
        new.isin = Some("US0000000002".into());

        let built = build(&[year(2024, vec![new]), year(2023, vec![old])]);
        let index = &built.index;

        assert_eq!(index.by_symbol["XYZ"].isin.as_deref(), Some("US0000000001"));
        assert_eq!(index.symbol_for_isin("US0000000001"), Some("XYZ"));
        assert_eq!(index.symbol_for_isin("US0000000002"), Some("XYZ"));
        assert!(built.summary.isin_reassignments.is_empty());
    }

    #[test]
    fn test_last_seen_metadata_policy() {
        let mut old = entry("XYZ", "2023-05-01", "2:1");
        old.isin = Some("US0000000001".into());
        old.exchange = Some("NYSE".into());
        let mut new = entry("XYZ", "2024-05-01", "2:1");
        new.name = "XYZ Holdings".into();
        new.isin = Some("US0000000002".into());

        let builder = IndexBuilder::new(IndexBuildOptions {
            metadata_policy: SymbolMetadataPolicy::LastSeen,
            ..IndexBuildOptions::default()
        });
        let built = builder.build(&[year(2023, vec![old]), year(2024, vec![new])], day());
        let data = &built.index.by_symbol["XYZ"];

        assert_eq!(data.name, "XYZ Holdings");
        assert_eq!(data.isin.as_deref(), Some("US0000000002"));
        // absent in the later entry, so the earlier value stays
        assert_eq!(data.exchange.as_deref(), Some("NYSE"));
    }

    #[test]
    fn test_isin_reassignment_recorded() {
        let mut a = entry("OLD", "2022-01-03", "2:1");
        a.isin = Some("US1111111111".into());
        let mut b = entry("NEW", "2024-01-03", "2:1");
        b.isin = Some("US1111111111".into());

        let built = build(&[year(2022, vec![a]), year(2024, vec![b])]);

        assert_eq!(built.index.symbol_for_isin("US1111111111"), Some("NEW"));
        assert_eq!(
            built.summary.isin_reassignments,
            vec![IsinReassignment {
                isin: "US1111111111".into(),
                previous_symbol: "OLD".into(),
                symbol: "NEW".into(),
                year: 2024,
            }]
        );
    }

    #[test]
    fn test_total_counts_entries_not_declared_count() {
        let mut file = year(2024, vec![entry("A", "2024-01-02", "2:1"), entry("B", "2024-01-03", "2:1")]);
        file.count = 7;

        let built = build(&[file]);
        assert_eq!(built.index.total_splits, 2);
        assert_eq!(built.summary.total_splits, 2);
    }

    #[test]
    fn test_empty_notes_omitted() {
        let mut e = entry("A", "2024-01-02", "2:1");
        e.notes = Some(String::new());
        let built = build(&[year(2024, vec![e])]);
        assert!(built.index.by_symbol["A"].splits[0].notes.is_none());
    }

    #[test]
    fn test_named_build_follows_file_names() {
        let mut old = entry("OLD", "2023-01-15", "2:1");
        old.isin = Some("US1111111111".into());
        let mut new = entry("NEW", "2022-01-15", "2:1");
        new.isin = Some("US1111111111".into());

        // 2024.json declares 2022, so it sorts first by year but last by name
        let files = vec![
            ("2024.json".to_string(), year(2022, vec![new])),
            ("2023.json".to_string(), year(2023, vec![old])),
        ];
        let builder = IndexBuilder::new(IndexBuildOptions::default());

        let named = builder.build_named(&files, day());
        assert_eq!(named.index.symbol_for_isin("US1111111111"), Some("NEW"));

        let plain: Vec<YearFile> = files.into_iter().map(|(_, file)| file).collect();
        let by_year = builder.build(&plain, day());
        assert_eq!(by_year.index.symbol_for_isin("US1111111111"), Some("OLD"));
    }

    #[test]
    fn test_duplicate_years_deduplicated() {
        let built = build(&[year(2024, vec![]), year(2024, vec![]), year(2023, vec![])]);
        assert_eq!(built.index.years, vec![2023, 2024]);
        assert_eq!(built.summary.files, 3);
    }

    #[test]
    fn test_stamp_and_version() {
        let builder = IndexBuilder::new(IndexBuildOptions {
            version: "2.1.0".into(),
            schema_ref: Some("../schema/index.schema.json".into()),
            metadata_policy: SymbolMetadataPolicy::FirstSeen,
        });
        let built = builder.build(&[], day());
        assert_eq!(built.index.version, "2.1.0");
        assert_eq!(built.index.updated, "2024-07-01");
        assert_eq!(
            built.index.schema_ref.as_deref(),
            Some("../schema/index.schema.json")
        );
        assert_eq!(built.index.total_splits, 0);
        assert!(built.index.by_symbol.is_empty());
    }
}
