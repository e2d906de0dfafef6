//! Error codes for the matchmaker API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// General validation error
    ValidationError,
    /// Invalid email address
    InvalidEmail,
    /// Malformed request body
    BadRequest,

    // Resource Not Found
    GameNotFound,
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Matchmaking Conflicts
    /// Game was already settled
    GameAlreadyClosed,
    /// Game has no players to settle
    EmptyRoster,
    /// Transaction kept conflicting until its retry budget ran out
    TxnConflict,
    /// Identifier collided with an existing row
    DuplicateId,
    /// Email already registered
    EmailTaken,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::BadRequest => "BAD_REQUEST",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::GameAlreadyClosed => "GAME_ALREADY_CLOSED",
            Self::EmptyRoster => "EMPTY_ROSTER",
            Self::TxnConflict => "TXN_CONFLICT",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::Conflict => "CONFLICT",

            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
