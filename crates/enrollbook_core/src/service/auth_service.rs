//! Authentication use-case service.
//!
//! # Responsibility
//! - Register users with hashed passwords and issue session tokens on login.
//! - Validate tokens and answer administrator checks.
//!
//! # Invariants
//! - Holds no mutable state; one instance is shared by all workers.
//! - Unknown login and wrong password produce the same error value and run the
//!   same amount of hashing work.
//! - `UserNotFound` from the repository is surfaced as `InvalidCredentials`
//!   on every identity check; other repository errors pass through unchanged.
//! - Plaintext passwords, hashes and tokens are never logged.

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::ErrorKind;
use crate::model::user::{NewUser, UserId};
use crate::repo::user_repo::{UserRepoError, UserRepository};
use crate::service::password::{CredentialHasher, HashingError};
use crate::service::token::{SessionClaims, TokenSigner};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Repo(#[from] UserRepoError),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error(transparent)]
    Hashing(#[from] HashingError),
    #[error("token issuance failed: {0}")]
    Issuance(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Repo(err) => err.kind(),
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::InvalidToken => ErrorKind::InvalidToken,
            Self::Hashing(_) | Self::Issuance(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug)]
pub struct AuthService {
    users: Arc<UserRepository>,
    hasher: CredentialHasher,
    signer: TokenSigner,
    token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Builds the service over `users`.
    ///
    /// Uses the configured signing seed when present, otherwise a random key.
    pub fn new(users: Arc<UserRepository>, config: &AuthConfig) -> AuthResult<Self> {
        let signer = match &config.signing_seed {
            Some(seed) => TokenSigner::from_seed(seed),
            None => {
                warn!("event=auth_init module=service status=ephemeral_key");
                TokenSigner::generate()
            }
        };
        Ok(Self {
            users,
            hasher: CredentialHasher::new(config.hashing)?,
            signer,
            token_ttl: config.token_ttl,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the time source used for token issue and expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Hashes the candidate's password and stores the user.
    ///
    /// # Errors
    /// - `Repo(UserRepoError::AlreadyExists)` when the login is taken.
    /// - `Hashing` when the hash backend fails.
    pub fn register(&self, candidate: NewUser) -> AuthResult<UserId> {
        let NewUser {
            login,
            password,
            profile,
            is_admin,
        } = candidate;
        let password_hash = self.hasher.hash(&password)?;
        let user = self
            .users
            .create_user(&login, password_hash, profile, is_admin)?;
        info!(
            "event=auth_register module=service status=ok user_id={} is_admin={}",
            user.id, user.is_admin
        );
        Ok(user.id)
    }

    /// Checks the login/password pair and issues a signed session token.
    pub fn login(&self, login: &str, password: &str) -> AuthResult<String> {
        let user = match self.users.get_user_by_login(login) {
            Ok(user) => user,
            Err(UserRepoError::NotFound(_)) => {
                self.hasher.verify_decoy(password);
                debug!("event=auth_login module=service status=rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        if !self.hasher.verify(password, &user.password_hash) {
            debug!("event=auth_login module=service status=rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = SessionClaims::for_user(&user, self.clock.now_secs(), self.token_ttl);
        let token = self
            .signer
            .sign(&claims)
            .map_err(|err| AuthError::Issuance(err.to_string()))?;
        info!(
            "event=auth_login module=service status=ok user_id={} exp={}",
            user.id, claims.exp
        );
        Ok(token)
    }

    /// Returns the stored administrator flag.
    ///
    /// A missing user is reported as `InvalidCredentials`, not `NotFound`.
    pub fn is_admin(&self, user_id: UserId) -> AuthResult<bool> {
        match self.users.get_user(user_id) {
            Ok(user) => Ok(user.is_admin),
            Err(UserRepoError::NotFound(_)) => Err(AuthError::InvalidCredentials),
            Err(err) => Err(err.into()),
        }
    }

    /// Verifies signature and expiry without touching the repository.
    pub fn validate_token(&self, token: &str) -> AuthResult<SessionClaims> {
        self.signer
            .verify(token, self.clock.now_secs())
            .map_err(|err| {
                debug!("event=auth_validate module=service status=rejected reason=\"{err}\"");
                AuthError::InvalidToken
            })
    }

    /// Registers an administrator with an empty profile.
    pub fn create_admin_user(&self, login: &str, password: &str) -> AuthResult<UserId> {
        self.register(NewUser::admin(login, password))
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn users(&self) -> &Arc<UserRepository> {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, AuthService};
    use crate::clock::FixedClock;
    use crate::config::{AuthConfig, HashingConfig};
    use crate::error::ErrorKind;
    use crate::model::user::{NewUser, UserProfile};
    use crate::repo::user_repo::{UserRepoError, UserRepository};
    use std::sync::Arc;

    fn service() -> AuthService {
        let config = AuthConfig {
            hashing: HashingConfig::minimal(),
            ..AuthConfig::default()
        };
        AuthService::new(Arc::new(UserRepository::new()), &config)
            .unwrap()
            .with_clock(Arc::new(FixedClock::default()))
    }

    #[test]
    fn register_stores_hash_not_plaintext() {
        let service = service();
        let id = service
            .register(NewUser::new("alice", "secret", UserProfile::default()))
            .unwrap();

        let stored = service.users().get_user(id).unwrap();
        assert_ne!(stored.password_hash.as_phc(), "secret");
        assert!(stored.password_hash.as_phc().starts_with("$argon2id$"));
    }

    #[test]
    fn duplicate_register_keeps_repository_error() {
        let service = service();
        service.create_admin_user("root", "a").unwrap();
        let err = service.create_admin_user("root", "b").unwrap_err();

        assert_eq!(
            err,
            AuthError::Repo(UserRepoError::AlreadyExists("root".to_string()))
        );
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn is_admin_hides_missing_users() {
        let service = service();
        assert_eq!(service.is_admin(42), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn error_kinds_follow_taxonomy() {
        assert_eq!(AuthError::InvalidToken.kind(), ErrorKind::InvalidToken);
        assert_eq!(
            AuthError::InvalidCredentials.kind(),
            ErrorKind::InvalidCredentials
        );
    }
}
