//! Grepable error codes shared by every service error type.

/// Implemented by service errors so collaborators can branch on a stable code
/// instead of parsing messages.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
