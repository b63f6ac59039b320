//! Dataset I/O
//!
//! The file-system collaborator around the validation and index core:
//! discovering and reading year files, writing artifacts atomically, and
//! merging candidate records from an external feed.

mod errors;
mod ingest;
mod source;
mod store;

pub use errors::{DatasetError, DatasetResult};
pub use ingest::{
    merge_candidates, CandidateSplit, IngestOptions, IngestSummary, RejectedCandidate,
};
pub use source::{Document, SourceFile};
pub use store::{write_json_atomic, DataDir, DEFAULT_INDEX_FILE};
