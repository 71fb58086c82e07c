//! Notifier port - advisory notifications toward the user.

use crate::domain::foundation::Notice;

/// Receives advisory notices. Must not block or fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
