//! Recording notifier for testing.
//!
//! # Panics
//!
//! Accessors use `.expect()` on the internal lock and panic if it is
//! poisoned. Intended for tests and UI previews only.

use std::sync::RwLock;

use crate::domain::foundation::{Notice, NoticeLevel};
use crate::ports::Notifier;

/// Captures every notice in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RwLock<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .read()
            .expect("RecordingNotifier: lock poisoned")
            .clone()
    }

    /// The most recent notice.
    pub fn last(&self) -> Option<Notice> {
        self.notices
            .read()
            .expect("RecordingNotifier: lock poisoned")
            .last()
            .cloned()
    }

    /// Count of notices at `level`.
    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .read()
            .expect("RecordingNotifier: lock poisoned")
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    /// True if some notice has this title.
    pub fn has_title(&self, title: &str) -> bool {
        self.notices
            .read()
            .expect("RecordingNotifier: lock poisoned")
            .iter()
            .any(|n| n.title == title)
    }

    pub fn clear(&self) {
        self.notices
            .write()
            .expect("RecordingNotifier: lock poisoned")
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.write() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_counts_levels() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::success("Tool Added", "a"));
        notifier.notify(Notice::error("Error", "b"));
        notifier.notify(Notice::error("Error", "c"));

        assert_eq!(notifier.notices().len(), 3);
        assert_eq!(notifier.count(NoticeLevel::Error), 2);
        assert_eq!(notifier.last().unwrap().message, "c");
        assert!(notifier.has_title("Tool Added"));

        notifier.clear();
        assert!(notifier.last().is_none());
    }
}
