//! Index Builder subsystem
//!
//! The index is derived state, rebuilt in full from the year files on every
//! build and never merged incrementally.
//!
//! # Design Principles
//!
//! - Derived state: year files are the source of truth
//! - Explicit accumulator: no ambient or static aggregation state
//! - Deterministic: files folded in file-name order (the integrity
//!   checker's order), BTreeMap output order
//!
//! # Invariants
//!
//! - Each symbol's splits are sorted by date, most recent first
//! - `years` is ascending and distinct
//! - `totalSplits` equals the number of entries folded in

mod builder;

pub use builder::{
    BuildSummary, IndexAccumulator, IndexBuild, IndexBuildOptions, IndexBuilder,
    IsinReassignment, SymbolMetadataPolicy, INDEX_FORMAT_VERSION,
};
