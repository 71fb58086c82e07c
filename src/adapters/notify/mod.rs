//! Notifier adapters.
//!
//! - `TracingNotifier` - writes each notice to the log
//! - `RecordingNotifier` - captures notices for assertions (tests, previews)

mod recording;
mod tracing_notifier;

pub use recording::RecordingNotifier;
pub use tracing_notifier::TracingNotifier;
