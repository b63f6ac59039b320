//! Stage scopes with begin/complete logging and elapsed time.

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// Logs `{name}_BEGIN` on creation and `{name}_COMPLETE` (with `duration_ms`)
/// or `{name}_FAILED` when closed.
///
/// ```ignore
/// let scope = ObservationScope::new("BUILD_INDEX");
/// // ... fold year files ...
/// scope.complete_with_fields(&[("symbols", "42")]);
/// ```
///
/// A scope dropped without being closed logs `{name}_INCOMPLETE` at WARN.
pub struct ObservationScope<'a> {
    name: &'a str,
    closed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Scope whose fields are repeated on the closing event.
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            closed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.closed.set(true);
        let elapsed = self.timer.elapsed_ms();
        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("duration_ms", &elapsed));
        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    pub fn fail(self, reason: &str) {
        self.closed.set(true);
        let elapsed = self.timer.elapsed_ms();
        Logger::error(
            &format!("{}_FAILED", self.name),
            &[("reason", reason), ("duration_ms", &elapsed)],
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.closed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer for `duration_ms` fields
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Elapsed milliseconds, formatted for a log field
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
