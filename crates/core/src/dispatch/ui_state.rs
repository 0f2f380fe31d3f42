//! Bookkeeping owned by the UI thread.
//!
//! Neither type is shared with workers, so there is no locking here.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;

use crate::types::{CheckResult, Location};

/// Captured at dispatch time and compared when the completion arrives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K = PathBuf> {
    pub target: K,
    pub sequence: u64,
}

/// Per-target request sequence numbers.
///
/// Every dispatch for a target takes a new ticket; only the newest ticket
/// for that target is current, so older results can be discarded.
#[derive(Debug)]
pub struct RequestTracker<K = PathBuf> {
    next: u64,
    latest: HashMap<K, u64>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            next: 0,
            latest: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, target: K) -> Ticket<K> {
        self.next += 1;
        self.latest.insert(target.clone(), self.next);
        Ticket {
            target,
            sequence: self.next,
        }
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.latest.get(&ticket.target) == Some(&ticket.sequence)
    }

    /// Make every outstanding ticket for `target` stale
    pub fn forget(&mut self, target: &K) {
        self.latest.remove(target);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMark {
    pub location: Location,
    pub message: String,
}

/// Most recent error location per target
#[derive(Debug, Default)]
pub struct ErrorMarks {
    marks: HashMap<PathBuf, ErrorMark>,
}

impl ErrorMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: impl Into<PathBuf>, location: Location, message: impl Into<String>) {
        self.marks.insert(
            target.into(),
            ErrorMark {
                location,
                message: message.into(),
            },
        );
    }

    pub fn clear(&mut self, target: &PathBuf) -> Option<ErrorMark> {
        self.marks.remove(target)
    }

    pub fn get(&self, target: &PathBuf) -> Option<&ErrorMark> {
        self.marks.get(target)
    }

    /// Replace the mark for `target` with the first located error in
    /// `result`, or clear it when there is none
    pub fn record(&mut self, target: impl Into<PathBuf>, result: &CheckResult) -> Option<&ErrorMark> {
        let target = target.into();
        match result.first_error_location() {
            Some((location, message)) => {
                self.set(target.clone(), location, message);
                self.marks.get(&target)
            }
            None => {
                self.marks.remove(&target);
                None
            }
        }
    }

    /// Hover text for `line` of `target`, whitespace collapsed
    pub fn message_at(&self, target: &PathBuf, line: u32) -> Option<String> {
        self.marks
            .get(target)
            .filter(|mark| mark.location.line == line && !mark.message.trim().is_empty())
            .map(|mark| mark.message.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckRow, Severity};

    #[test]
    fn test_newer_request_makes_older_stale() {
        let mut tracker = RequestTracker::new();
        let target = PathBuf::from("/proj/a.py");

        let first = tracker.begin(target.clone());
        let second = tracker.begin(target.clone());
        let other = tracker.begin(PathBuf::from("/proj/b.py"));

        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(tracker.is_current(&other));

        tracker.forget(&target);
        assert!(!tracker.is_current(&second));
        assert!(tracker.is_current(&other));
    }

    #[test]
    fn test_error_marks_follow_latest_result() {
        let mut marks = ErrorMarks::new();
        let target = PathBuf::from("/proj/a.py");

        let mut failing = CheckResult::new();
        failing.extend_rows([
            CheckRow::new(Severity::Warning, "unused", Some(Location::line(2))),
            CheckRow::new(Severity::Error, "invalid   syntax\n here", Some(Location::line(7))),
        ]);
        let mark = marks.record(target.clone(), &failing).unwrap();
        assert_eq!(mark.location.line, 7);

        assert_eq!(marks.message_at(&target, 7).as_deref(), Some("invalid syntax here"));
        assert_eq!(marks.message_at(&target, 6), None);

        assert!(marks.record(target.clone(), &CheckResult::new()).is_none());
        assert!(marks.is_empty());
    }
}
