//! Observable events for the split pipeline.
//!
//! Events are explicit and typed; free-form event names only come from
//! `ObservationScope` stage prefixes.

use std::fmt;

use super::logger::Severity;

/// Observable events in a validate / build / ingest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration resolved (file or defaults)
    ConfigLoaded,
    /// Schemas registered
    SchemasLoaded,
    /// Schema directory missing, builtin schemas in use
    SchemasBuiltinFallback,

    // Dataset
    /// Year files read from the data directory
    DatasetLoaded,
    /// A year file passed validation
    FileChecked,
    /// A year file failed validation
    FileInvalid,
    /// Full dataset report produced
    ValidationComplete,
    /// Existing index file checked against its schema
    IndexChecked,

    // Index
    /// Index assembled in memory
    IndexBuilt,
    /// ISIN moved to a different symbol during the fold
    IsinReassigned,
    /// Build skipped because the dataset has findings
    IndexBuildRefused,
    /// Build went ahead despite findings
    IndexBuildForced,
    /// Year file left out of a forced build because it does not decode
    YearFileSkipped,
    /// Index written to disk
    IndexWritten,

    // Ingest
    /// Candidate list read
    CandidatesLoaded,
    /// Candidate rejected before merging
    CandidateRejected,
    /// Year file rewritten after merge
    YearFileWritten,
    /// Merge finished
    IngestComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemasBuiltinFallback => "SCHEMAS_BUILTIN_FALLBACK",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::FileChecked => "FILE_CHECKED",
            Event::FileInvalid => "FILE_INVALID",
            Event::ValidationComplete => "VALIDATION_COMPLETE",
            Event::IndexChecked => "INDEX_CHECKED",
            Event::IndexBuilt => "INDEX_BUILT",
            Event::IsinReassigned => "ISIN_REASSIGNED",
            Event::IndexBuildRefused => "INDEX_BUILD_REFUSED",
            Event::IndexBuildForced => "INDEX_BUILD_FORCED",
            Event::YearFileSkipped => "YEAR_FILE_SKIPPED",
            Event::IndexWritten => "INDEX_WRITTEN",
            Event::CandidatesLoaded => "CANDIDATES_LOADED",
            Event::CandidateRejected => "CANDIDATE_REJECTED",
            Event::YearFileWritten => "YEAR_FILE_WRITTEN",
            Event::IngestComplete => "INGEST_COMPLETE",
        }
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::FileInvalid
            | Event::IsinReassigned
            | Event::CandidateRejected
            | Event::IndexBuildForced
            | Event::YearFileSkipped
            | Event::SchemasBuiltinFallback => Severity::Warn,
            Event::IndexBuildRefused => Severity::Error,
            Event::FileChecked => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
