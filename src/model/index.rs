//! The aggregated lookup index
//!
//! Maps are `BTreeMap`s so the serialized index is byte-stable for a fixed
//! input, independent of hash seeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One split as it appears under a symbol in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSplit {
    pub date: String,
    pub ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything the index knows about one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Most recent first
    pub splits: Vec<IndexedSplit>,
}

/// Denormalized index over all year files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
    pub version: String,
    pub updated: String,
    pub total_splits: usize,
    pub years: Vec<i32>,
    pub by_symbol: BTreeMap<String, SymbolData>,
    pub by_isin: BTreeMap<String, String>,
}

impl IndexFile {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolData> {
        self.by_symbol.get(symbol)
    }

    /// Resolves an ISIN to the symbol that last declared it.
    pub fn symbol_for_isin(&self, isin: &str) -> Option<&str> {
        self.by_isin.get(isin).map(String::as_str)
    }

    /// Most recent split recorded for `symbol`.
    pub fn latest_split(&self, symbol: &str) -> Option<&IndexedSplit> {
        self.symbol(symbol).and_then(|data| data.splits.first())
    }

    pub fn symbol_count(&self) -> usize {
        self.by_symbol.len()
    }
}
