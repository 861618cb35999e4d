//! Basename and modification-time filtering for discovered files.

use std::ops::RangeInclusive;
use std::path::Path;
use std::time::SystemTime;

use regex::Regex;

/// Decides whether a discovered regular file qualifies for upload.
///
/// The filter is a pure predicate over a file's basename and modification
/// time. Traversal only hands it regular files, so directories never reach
/// it.
pub struct PathFilter {
    name_filter: Regex,
    time_window: RangeInclusive<SystemTime>,
}

impl PathFilter {
    /// Create a filter from a basename pattern and an inclusive
    /// modification-time window.
    pub fn new(name_filter: Regex, time_window: RangeInclusive<SystemTime>) -> Self {
        PathFilter {
            name_filter,
            time_window,
        }
    }

    /// Returns true when the file's basename matches the pattern and its
    /// modification time falls inside the window. Both conditions must
    /// hold.
    pub fn qualifies(&self, path: &Path, modified: SystemTime) -> bool {
        let basename = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };

        self.name_filter.is_match(&basename) && self.time_window.contains(&modified)
    }
}
