//! Split entries and the yearly partition files that hold them

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// New-shares:old-shares, both positive decimal integers.
pub const RATIO_PATTERN: &str = "^[0-9]+:[0-9]+$";

/// Two-letter country prefix followed by ten alphanumerics.
pub const ISIN_PATTERN: &str = "^[A-Z]{2}[A-Z0-9]{10}$";

fn ratio_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RATIO_PATTERN).expect("ratio pattern is a valid regex"))
}

fn isin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ISIN_PATTERN).expect("ISIN pattern is a valid regex"))
}

/// Returns true if `ratio` has the `new:old` shape.
pub fn is_valid_ratio(ratio: &str) -> bool {
    ratio_regex().is_match(ratio)
}

/// Returns true if `isin` has the ISIN shape. The check digit is not verified.
pub fn is_valid_isin(isin: &str) -> bool {
    isin_regex().is_match(isin)
}

/// Returns true for a real calendar date written exactly as `YYYY-MM-DD`.
pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10
        && value
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() })
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Extracts the year from the leading four digits of a date string.
///
/// Only the prefix is inspected, so `"2024-13-99"` still yields 2024. Full
/// date validity is a schema concern.
pub fn date_year(date: &str) -> Option<i32> {
    let prefix = date.get(0..4)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Returns true for names of the form `NNNN.json`.
pub fn is_year_file_name(name: &str) -> bool {
    year_from_file_name(name).is_some()
}

/// Parses the year encoded in a year file name such as `2024.json`.
pub fn year_from_file_name(name: &str) -> Option<i32> {
    let stem = name.strip_suffix(".json")?;
    if stem.len() != 4 || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// File name for a year partition, zero-padded so lexical order is year order.
pub fn year_file_name(year: i32) -> String {
    format!("{:04}.json", year)
}

/// Dataset-wide identity of a split event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SplitKey {
    pub symbol: String,
    pub date: String,
}

impl SplitKey {
    pub fn new(symbol: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            date: date.into(),
        }
    }
}

impl fmt::Display for SplitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.symbol, self.date)
    }
}

/// One corporate split event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEntry {
    /// Exchange ticker
    pub symbol: String,
    /// Issuer display name
    pub name: String,
    /// Execution date, `YYYY-MM-DD`
    pub date: String,
    /// `new:old` share ratio
    pub ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SplitEntry {
    /// Creates an entry with only the required fields set.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        date: impl Into<String>,
        ratio: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            date: date.into(),
            ratio: ratio.into(),
            isin: None,
            exchange: None,
            source: None,
            verified: None,
            notes: None,
        }
    }

    pub fn key(&self) -> SplitKey {
        SplitKey::new(&self.symbol, &self.date)
    }

    pub fn date_year(&self) -> Option<i32> {
        date_year(&self.date)
    }
}

/// A yearly partition of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFile {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
    pub year: i32,
    pub updated: String,
    #[serde(default)]
    pub count: usize,
    pub splits: Vec<SplitEntry>,
}

impl YearFile {
    /// Creates an empty partition for `year`.
    pub fn new(year: i32, updated: NaiveDate, schema_ref: Option<String>) -> Self {
        Self {
            schema_ref,
            year,
            updated: updated.format("%Y-%m-%d").to_string(),
            count: 0,
            splits: Vec::new(),
        }
    }

    pub fn file_name(&self) -> String {
        year_file_name(self.year)
    }

    /// Restores the on-disk conventions before a write: splits ordered by
    /// date then symbol, `count` equal to the number of splits, and
    /// `updated` stamped with `today`.
    pub fn normalize(&mut self, today: NaiveDate) {
        self.splits
            .sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
        self.count = self.splits.len();
        self.updated = today.format("%Y-%m-%d").to_string();
    }

    pub fn contains(&self, key: &SplitKey) -> bool {
        self.splits
            .iter()
            .any(|s| s.symbol == key.symbol && s.date == key.date)
    }
}
