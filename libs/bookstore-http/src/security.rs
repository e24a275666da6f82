//! HTTP security utilities.

/// Maximum body preview size for error messages (8KB).
///
/// Non-2xx bodies are read up to this size before classification so that a
/// hostile or broken server cannot make the error path buffer megabytes.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Placeholder preview when the error body exceeds the limit.
pub const BODY_TOO_LARGE_PREVIEW: &str = "<body too large for preview>";
