//! Log-backed notifier.

use crate::domain::foundation::{Notice, NoticeLevel};
use crate::ports::Notifier;

/// Emits notices as tracing events. The default notifier for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!(title = %notice.title, "{}", notice.message)
            }
            NoticeLevel::Warning => tracing::warn!(title = %notice.title, "{}", notice.message),
            NoticeLevel::Error => tracing::error!(title = %notice.title, "{}", notice.message),
        }
    }
}
