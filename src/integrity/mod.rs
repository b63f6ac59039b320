//! Integrity Checker
//!
//! Validates the dataset as a unit. Some invariants only exist across files
//! (a `(symbol, date)` pair is unique dataset-wide), so files are never
//! judged in isolation.
//!
//! # Guarantees
//!
//! - Every finding is collected; nothing stops the run early
//! - A file that is not JSON gets one `MALFORMED_INPUT` finding and the
//!   other files are still checked
//! - Reports are deterministic for a fixed set of input files

mod checker;
mod finding;
mod tracker;

pub use checker::IntegrityChecker;
pub use finding::{FileReport, Finding, FindingKind, IntegrityReport};
pub use tracker::DuplicateTracker;
