//! Error contract shared by every slice.
//!
//! Domain errors expose a stable, machine readable code and a coarse [`ErrorKind`]. The HTTP
//! layer maps kinds to status codes; nothing below the web layer knows about HTTP.

/// Code reported by every successful response.
pub const SUCCESS: &str = "SUCCESS";
/// Request body or query failed validation.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// An argument was well-formed but not acceptable.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
/// Concurrent modification was detected and retries were exhausted.
pub const OPTIMISTIC_LOCK_CONFLICT: &str = "OPTIMISTIC_LOCK_CONFLICT";
/// Anything unexpected. Details stay in the logs.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller sent something the domain rejects.
    BadRequest,
    /// The addressed resource does not exist.
    NotFound,
    /// A concurrent update won the race.
    Conflict,
    /// A fault on our side.
    Internal,
}

/// Implemented by error enums through `#[remit_error]` and `#[api(...)]` variant mappings.
pub trait ErrorCode: std::error::Error {
    /// Stable code, e.g. `ACCOUNT_001`.
    fn code(&self) -> &'static str;

    fn kind(&self) -> ErrorKind;

    fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Codes shared across slices carry their message in the status block as well.
    fn is_generic(&self) -> bool {
        matches!(
            self.code(),
            VALIDATION_ERROR | INVALID_ARGUMENT | OPTIMISTIC_LOCK_CONFLICT | INTERNAL_ERROR
        )
    }
}
