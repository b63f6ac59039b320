//! Dataset-wide duplicate detection
//!
//! The tracker is the accumulator threaded through the per-file fold. The
//! first file to declare a `(symbol, date)` owns it; every later sighting,
//! in the same file or another, is a duplicate.

use std::collections::HashMap;

use crate::model::SplitKey;

#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: HashMap<SplitKey, String>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting of `key` in `file`.
    ///
    /// Returns the name of the file that declared the key first if this
    /// sighting is a duplicate.
    pub fn observe(&mut self, key: SplitKey, file: &str) -> Option<&str> {
        use std::collections::hash_map::Entry;

        match self.seen.entry(key) {
            Entry::Occupied(original) => Some(original.into_mut().as_str()),
            Entry::Vacant(slot) => {
                slot.insert(file.to_string());
                None
            }
        }
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
