//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, RuntimeConfig};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// The filter comes from `RUST_LOG`, falling back to `runtime.log_level`.
/// Output is plain text unless `runtime.log_format` is `json`;
/// `TOOL_DIRECTORY_LOG_FORMAT` overrides the configured format.
pub fn init_tracing(runtime: &RuntimeConfig) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&runtime.log_level));
        let format = log_format_override().unwrap_or(runtime.log_format);

        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Plain => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .try_init(),
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

fn log_format_override() -> Option<LogFormat> {
    let value = std::env::var("TOOL_DIRECTORY_LOG_FORMAT").ok()?;
    if value.eq_ignore_ascii_case("json") {
        Some(LogFormat::Json)
    } else if value.eq_ignore_ascii_case("plain") {
        Some(LogFormat::Plain)
    } else {
        None
    }
}
