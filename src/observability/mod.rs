//! Observability for the split pipeline
//!
//! - Structured JSON log lines on stderr
//! - Typed lifecycle events
//! - Stage scopes with elapsed time
//!
//! Logging never changes what a command computes, and a failed write to
//! stderr is ignored.
//!
//! ```ignore
//! use splitdb::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::DatasetLoaded, &[("files", "12")]);
//!
//! let scope = ObservationScope::new("VALIDATE");
//! // ... check files ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
