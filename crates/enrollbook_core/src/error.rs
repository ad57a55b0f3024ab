//! Closed error classification shared by every core error type.
//!
//! # Responsibility
//! - Give transport layers one stable value to map onto status codes.
//!
//! # Invariants
//! - The set of kinds is closed; adding a kind is a breaking change.
//! - Presentation may change, the kind returned for a given failure may not.

use serde::Serialize;

/// Coarse failure category exposed across the core boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Identifier or unique key is absent.
    NotFound,
    /// Unique key collision.
    AlreadyExists,
    /// Login/password mismatch, or an identity lookup that must not leak.
    InvalidCredentials,
    /// Token failed structural, signature or expiry checks.
    InvalidToken,
    /// Authenticated caller lacks the required role.
    Forbidden,
    /// Caller input failed field-level validation.
    InvalidInput,
    /// Failure not attributable to caller input.
    Internal,
}

impl ErrorKind {
    /// Stable snake_case name, suitable for logs and response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken => "invalid_token",
            Self::Forbidden => "forbidden",
            Self::InvalidInput => "invalid_input",
            Self::Internal => "internal",
        }
    }
}
