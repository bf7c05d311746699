//! Error taxonomy for the board core.
//!
//! Handlers classify failures so the dispatcher can choose the right user
//! response: validation problems echo a correctable message, permission
//! problems get a terse denial, and store failures are logged and answered
//! with a generic apology while the conversation state is dropped.

use thiserror::Error;

/// User-correctable input problems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Normalized text fell below the minimum length.
    #[error("text too short (minimum {min} characters)")]
    TooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Normalized text exceeded the maximum length.
    #[error("text too long (maximum {max} characters)")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Display name is outside the accepted length bounds.
    #[error("username must be {min}-{max} characters")]
    UsernameLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Display name contains a character outside the accepted set.
    #[error("username may only contain letters, digits and underscores")]
    UsernameCharset,
}

/// Denials that leak no detail beyond the category.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    /// The acting user has an active ban.
    #[error("user is banned")]
    Banned,
    /// The acting user does not own the target entity.
    #[error("not the author")]
    NotAuthor,
    /// The action is reserved for the administrator.
    #[error("admin only")]
    AdminOnly,
}

/// Failure surfaced by an action handler.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Bad length or format; the user may correct and retry.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Action denied.
    #[error("permission denied: {0}")]
    Permission(#[from] PermissionError),
    /// Target entity is missing, likely a stale menu.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A uniqueness or duplicate guard fired.
    #[error("conflict: {0}")]
    Conflict(&'static str),
    /// The store rejected a query.
    #[error("store failure")]
    Store(#[from] diesel::result::Error),
    /// The store could not be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl BoardError {
    /// Whether the conversation state should be retained so the user can
    /// retry the same pending input.
    ///
    /// Only validation failures are recoverable; everything else clears the
    /// in-flight conversation to avoid repeated failure loops.
    #[must_use]
    pub const fn retains_state(&self) -> bool { matches!(self, Self::Validation(_)) }
}

/// Convenience alias used by the ops and command layers.
pub type BoardResult<T> = Result<T, BoardError>;
