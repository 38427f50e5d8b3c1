//! Process-wide logging setup.

pub mod logging;

pub use logging::LogSettings;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(settings: &LogSettings) {
    logging::init(settings);
}
