//! User domain model.
//!
//! # Responsibility
//! - Define the stored user record and the registration candidate.
//! - Keep credential material out of `Debug` output and serialization.
//!
//! # Invariants
//! - `login` is unique among live users (enforced by `UserRepository`).
//! - `password_hash` is a PHC-format one-way hash, never plaintext.

use super::RecordId;
use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// Identifier of a user record.
pub type UserId = RecordId;

/// PHC-format password hash (`$argon2id$v=19$...`).
///
/// `Debug` is redacted so a hash never ends up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an already computed PHC string.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl Debug for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// Personal details carried by every user and embedded into session tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub phone: String,
    pub email: String,
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_admin: bool,
}

impl User {
    /// Builds a stored record around a collection-assigned id.
    pub fn new(
        id: UserId,
        login: impl Into<String>,
        password_hash: PasswordHash,
        profile: UserProfile,
        is_admin: bool,
    ) -> Self {
        Self {
            id,
            login: login.into(),
            password_hash,
            profile,
            is_admin,
        }
    }
}

/// Registration candidate holding the plaintext password.
///
/// Consumed by `AuthService::register`, which hashes the password before
/// anything reaches the repository.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub profile: UserProfile,
    pub is_admin: bool,
}

impl NewUser {
    /// Creates a non-admin candidate.
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        profile: UserProfile,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            profile,
            is_admin: false,
        }
    }

    /// Creates an administrator candidate with an empty profile.
    pub fn admin(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::new(login, password, UserProfile::default())
        }
    }
}

impl Debug for NewUser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("profile", &self.profile)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}
