//! Record types for the split dataset
//!
//! Year files are the source of truth. The index is a derived artifact
//! rebuilt from scratch on every build and never edited by hand.
//!
//! Optional fields are present or absent. A JSON `null` is never a valid
//! encoding of "absent" and is rejected by the schema validator.

mod index;
mod split;

pub use index::{IndexFile, IndexedSplit, SymbolData};
pub use split::{
    date_year, is_iso_date, is_valid_isin, is_valid_ratio, is_year_file_name, year_file_name,
    year_from_file_name, SplitEntry, SplitKey, YearFile, ISIN_PATTERN, RATIO_PATTERN,
};
