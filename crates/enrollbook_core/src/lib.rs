//! Core domain logic for enrollbook, a course-enrollment backend.
//! This crate owns users, enrollment entries, credentials and sessions;
//! transport layers only call into it.

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use bootstrap::{BootstrapError, Core};
pub use clock::{Clock, SystemClock};
pub use config::{AuthConfig, ConfigError, CoreConfig, HashingConfig};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::entry::{Entry, EntryId, EntryStatus};
pub use model::user::{NewUser, PasswordHash, User, UserId, UserProfile};
pub use repo::collection::{CollectionNotFound, IndexedCollection};
pub use repo::entry_repo::{EntryRepoError, EntryRepoResult, EntryRepository};
pub use repo::user_repo::{UserLookup, UserRepoError, UserRepoResult, UserRepository};
pub use repo::Store;
pub use service::access::{bearer_token, AccessControl, AccessError};
pub use service::auth_service::{AuthError, AuthResult, AuthService};
pub use service::token::SessionClaims;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
