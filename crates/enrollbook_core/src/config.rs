//! Process configuration for the core.
//!
//! # Responsibility
//! - Collect logging, token, hashing and bootstrap settings in one place.
//! - Load them from `ENROLLBOOK_*` environment variables.
//!
//! # Invariants
//! - Loading never panics; malformed values surface as `ConfigError`.
//! - Secrets (signing seed, admin password) are redacted from `Debug`.

use crate::error::ErrorKind;
use crate::logging::default_log_level;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_LOG_LEVEL: &str = "ENROLLBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ENROLLBOOK_LOG_DIR";
pub const ENV_TOKEN_TTL_SECS: &str = "ENROLLBOOK_TOKEN_TTL_SECS";
pub const ENV_SIGNING_SEED: &str = "ENROLLBOOK_SIGNING_SEED";
pub const ENV_HASH_MEMORY_KIB: &str = "ENROLLBOOK_HASH_MEMORY_KIB";
pub const ENV_HASH_ITERATIONS: &str = "ENROLLBOOK_HASH_ITERATIONS";
pub const ENV_HASH_PARALLELISM: &str = "ENROLLBOOK_HASH_PARALLELISM";
pub const ENV_ADMIN_LOGIN: &str = "ENROLLBOOK_ADMIN_LOGIN";
pub const ENV_ADMIN_PASSWORD: &str = "ENROLLBOOK_ADMIN_PASSWORD";

/// Session lifetime used when nothing else is configured.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_ADMIN_LOGIN: &str = "admin";
/// Length of an Ed25519 signing seed in bytes.
pub const SIGNING_SEED_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{var}` is not valid: {reason}")]
    InvalidValue { var: &'static str, reason: String },
    #[error("`{0}` must be set")]
    Missing(&'static str),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Internal
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashingConfig {
    /// Smallest parameters Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: argon2::Params::MIN_M_COST,
            iterations: argon2::Params::MIN_T_COST,
            parallelism: argon2::Params::MIN_P_COST,
        }
    }
}

/// Token and credential settings consumed by `AuthService`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub token_ttl: Duration,
    /// Ed25519 seed. A fresh random key is generated when `None`, which
    /// invalidates all tokens on restart.
    pub signing_seed: Option<[u8; SIGNING_SEED_LEN]>,
    pub hashing: HashingConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: DEFAULT_TOKEN_TTL,
            signing_seed: None,
            hashing: HashingConfig::default(),
        }
    }
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_ttl", &self.token_ttl)
            .field(
                "signing_seed",
                &self.signing_seed.map(|_| "[REDACTED]"),
            )
            .field("hashing", &self.hashing)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files. File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub auth: AuthConfig,
    pub admin_login: String,
    pub admin_password: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            auth: AuthConfig::default(),
            admin_login: DEFAULT_ADMIN_LOGIN.to_string(),
            admin_password: None,
        }
    }
}

impl Debug for CoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("auth", &self.auth)
            .field("admin_login", &self.admin_login)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CoreConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let token_ttl = match read(ENV_TOKEN_TTL_SECS) {
            Some(raw) => Duration::from_secs(parse_number(ENV_TOKEN_TTL_SECS, &raw)?),
            None => defaults.auth.token_ttl,
        };
        let signing_seed = read(ENV_SIGNING_SEED)
            .map(|raw| parse_seed(&raw))
            .transpose()?;
        let hashing = HashingConfig {
            memory_kib: read_number(&read, ENV_HASH_MEMORY_KIB, defaults.auth.hashing.memory_kib)?,
            iterations: read_number(&read, ENV_HASH_ITERATIONS, defaults.auth.hashing.iterations)?,
            parallelism: read_number(
                &read,
                ENV_HASH_PARALLELISM,
                defaults.auth.hashing.parallelism,
            )?,
        };

        let config = Self {
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            auth: AuthConfig {
                token_ttl,
                signing_seed,
                hashing,
            },
            admin_login: read(ENV_ADMIN_LOGIN).unwrap_or(defaults.admin_login),
            admin_password: read(ENV_ADMIN_PASSWORD),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints not expressible in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: ENV_TOKEN_TTL_SECS,
                reason: "token lifetime must be positive".to_string(),
            });
        }
        let hashing = self.auth.hashing;
        argon2::Params::new(
            hashing.memory_kib,
            hashing.iterations,
            hashing.parallelism,
            None,
        )
        .map_err(|err| ConfigError::InvalidValue {
            var: ENV_HASH_MEMORY_KIB,
            reason: format!("argon2 parameters rejected: {err}"),
        })?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    var: ENV_LOG_DIR,
                    reason: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
        }
        Ok(())
    }

    /// Returns the bootstrap admin password or a `Missing` error.
    pub fn require_admin_password(&self) -> Result<&str, ConfigError> {
        self.admin_password
            .as_deref()
            .ok_or(ConfigError::Missing(ENV_ADMIN_PASSWORD))
    }
}

fn read_number<R>(read: &R, var: &'static str, default: u32) -> Result<u32, ConfigError>
where
    R: Fn(&str) -> Option<String>,
{
    match read(var) {
        Some(raw) => parse_number(var, &raw),
        None => Ok(default),
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|err| ConfigError::InvalidValue {
        var,
        reason: format!("`{raw}`: {err}"),
    })
}

fn parse_seed(raw: &str) -> Result<[u8; SIGNING_SEED_LEN], ConfigError> {
    let bytes = hex::decode(raw).map_err(|err| ConfigError::InvalidValue {
        var: ENV_SIGNING_SEED,
        reason: format!("expected hex: {err}"),
    })?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| ConfigError::InvalidValue {
            var: ENV_SIGNING_SEED,
            reason: format!("expected {SIGNING_SEED_LEN} bytes, got {}", bytes.len()),
        })
}
