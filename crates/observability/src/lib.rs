//! Tracing/logging setup shared by every binary.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide logging in `format`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
