//! Merging externally fetched candidate splits into year files
//!
//! The fetch itself happens elsewhere. This module receives the candidates
//! already materialized in memory, drops the ones the dataset already has,
//! and appends the rest to the right year partition.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{date_year, is_iso_date, SplitEntry, SplitKey, YearFile};

/// A split as reported by the upstream corporate-actions feed.
///
/// The feed types split factors as plain JSON numbers, so they are read as
/// `f64` and anything other than a positive whole number is rejected per
/// candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSplit {
    pub ticker: String,
    pub execution_date: String,
    /// Old share count
    pub split_from: f64,
    /// New share count
    pub split_to: f64,
}

impl CandidateSplit {
    pub fn key(&self) -> SplitKey {
        SplitKey::new(&self.ticker, &self.execution_date)
    }

    /// `new:old`, the dataset's ratio convention.
    ///
    /// Only meaningful for accepted candidates, whose factors are whole.
    pub fn ratio(&self) -> String {
        format!("{}:{}", self.split_to as u64, self.split_from as u64)
    }

    fn rejection(&self) -> Option<&'static str> {
        if self.ticker.trim().is_empty() {
            Some("empty ticker")
        } else if !is_iso_date(&self.execution_date) {
            Some("execution date is not YYYY-MM-DD")
        } else if !is_whole_factor(self.split_from) || !is_whole_factor(self.split_to) {
            Some("split factor is not a positive whole number")
        } else {
            None
        }
    }

    /// Builds the dataset entry. The issuer name is not known upstream, so
    /// the ticker stands in until someone edits it.
    fn to_entry(&self, source: &str) -> SplitEntry {
        let mut entry = SplitEntry::new(&self.ticker, &self.ticker, &self.execution_date, self.ratio());
        entry.source = Some(source.to_string());
        entry
    }
}

fn is_whole_factor(factor: f64) -> bool {
    factor.is_finite() && factor >= 1.0 && factor.fract() == 0.0
}

/// Parameters for a merge.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Value written to each new entry's `source`
    pub source: String,
    /// `$schema` reference written into newly created year files
    pub year_file_schema_ref: Option<String>,
    /// Stamp for `updated` on every touched year file
    pub today: NaiveDate,
}

/// A candidate that could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    pub candidate: CandidateSplit,
    pub reason: &'static str,
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestSummary {
    /// Entries appended, in candidate order
    pub added: Vec<SplitKey>,
    /// Candidates already present in the dataset or earlier in the batch
    pub skipped: Vec<SplitKey>,
    pub rejected: Vec<RejectedCandidate>,
    /// Years whose files changed and must be written
    pub touched_years: BTreeSet<i32>,
}

impl IngestSummary {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty()
    }
}

/// Appends new candidates to `files`, keyed by year.
///
/// Year files that do not exist yet are created. Every touched file is
/// re-sorted by date then symbol, gets a fresh `count`, and is stamped with
/// `options.today`. Untouched files are left exactly as they were.
pub fn merge_candidates(
    files: &mut BTreeMap<i32, YearFile>,
    candidates: &[CandidateSplit],
    options: &IngestOptions,
) -> IngestSummary {
    let mut known: HashSet<SplitKey> = files
        .values()
        .flat_map(|file| file.splits.iter().map(SplitEntry::key))
        .collect();

    let mut summary = IngestSummary::default();

    for candidate in candidates {
        if let Some(reason) = candidate.rejection() {
            summary.rejected.push(RejectedCandidate {
                candidate: candidate.clone(),
                reason,
            });
            continue;
        }

        let key = candidate.key();
        if !known.insert(key.clone()) {
            summary.skipped.push(key);
            continue;
        }

        // is_iso_date held, so the prefix is four digits
        let Some(year) = date_year(&candidate.execution_date) else {
            continue;
        };

        let file = files.entry(year).or_insert_with(|| {
            YearFile::new(year, options.today, options.year_file_schema_ref.clone())
        });
        file.splits.push(candidate.to_entry(&options.source));
        summary.touched_years.insert(year);
        summary.added.push(key);
    }

    for year in &summary.touched_years {
        if let Some(file) = files.get_mut(year) {
            file.normalize(options.today);
        }
    }

    summary
}
