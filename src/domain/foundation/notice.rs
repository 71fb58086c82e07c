//! Advisory notifications.
//!
//! A `Notice` is a non-blocking, user-facing message describing the outcome
//! of an operation. The session manager and the tool store emit them through
//! the `Notifier` port instead of returning errors past their boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A single advisory notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    /// Destructive notices are rendered differently by the UI.
    pub fn is_destructive(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_level() {
        assert_eq!(Notice::success("a", "b").level, NoticeLevel::Success);
        assert_eq!(Notice::info("a", "b").level, NoticeLevel::Info);
        assert_eq!(Notice::warning("a", "b").level, NoticeLevel::Warning);
        assert!(Notice::error("Error", "boom").is_destructive());
        assert!(!Notice::success("Tool Added", "ok").is_destructive());
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&NoticeLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
