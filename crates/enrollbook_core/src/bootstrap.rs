//! Process startup wiring.
//!
//! # Responsibility
//! - Build the shared store, the auth service and access control from config.
//! - Seed exactly one administrator before the host starts serving.
//!
//! # Invariants
//! - `Core::start` either returns a fully seeded core or an error; no partial
//!   core escapes.

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, CoreConfig};
use crate::error::ErrorKind;
use crate::model::user::UserId;
use crate::repo::Store;
use crate::service::access::AccessControl;
use crate::service::auth_service::{AuthError, AuthService};
use log::info;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("administrator seeding failed: {0}")]
    Auth(#[from] AuthError),
}

impl BootstrapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(err) => err.kind(),
            Self::Auth(err) => err.kind(),
        }
    }
}

/// Everything a host needs to serve requests.
#[derive(Debug, Clone)]
pub struct Core {
    pub store: Store,
    pub auth: Arc<AuthService>,
    pub access: AccessControl,
    pub admin_id: UserId,
}

impl Core {
    /// Builds a core on the system clock and seeds the administrator.
    ///
    /// # Errors
    /// - `Config` when the config is invalid or has no admin password.
    /// - `Auth` when the administrator cannot be created.
    pub fn start(config: &CoreConfig) -> Result<Self, BootstrapError> {
        Self::start_with_clock(config, Arc::new(SystemClock))
    }

    pub fn start_with_clock(
        config: &CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BootstrapError> {
        config.validate()?;
        let admin_password = config.require_admin_password()?;

        let store = Store::new();
        let auth = AuthService::new(Arc::clone(&store.users), &config.auth)?.with_clock(clock);
        let auth = Arc::new(auth);
        let admin_id = auth.create_admin_user(&config.admin_login, admin_password)?;
        info!(
            "event=core_init module=bootstrap status=ok admin_id={} token_ttl_secs={}",
            admin_id,
            auth.token_ttl().as_secs()
        );

        Ok(Self {
            access: AccessControl::new(Arc::clone(&auth)),
            store,
            auth,
            admin_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BootstrapError, Core};
    use crate::config::{ConfigError, CoreConfig, HashingConfig, ENV_ADMIN_PASSWORD};
    use crate::error::ErrorKind;

    fn config() -> CoreConfig {
        let mut config = CoreConfig {
            admin_password: Some("root-pass".to_string()),
            ..CoreConfig::default()
        };
        config.auth.hashing = HashingConfig::minimal();
        config
    }

    #[test]
    fn start_seeds_single_admin() {
        let core = Core::start(&config()).unwrap();

        assert_eq!(core.admin_id, 1);
        assert_eq!(core.store.users.len(), 1);
        assert_eq!(core.auth.is_admin(core.admin_id), Ok(true));
        assert!(core.store.entries.is_empty());
    }

    #[test]
    fn start_requires_admin_password() {
        let config = CoreConfig {
            admin_password: None,
            ..config()
        };
        let err = Core::start(&config).unwrap_err();
        assert_eq!(
            err,
            BootstrapError::Config(ConfigError::Missing(ENV_ADMIN_PASSWORD))
        );
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn seeded_admin_can_log_in() {
        let core = Core::start(&config()).unwrap();
        let token = core.auth.login("admin", "root-pass").unwrap();
        let header = format!("Bearer {token}");

        let claims = core.access.authorize_admin(Some(&header)).unwrap();
        assert_eq!(claims.uid, core.admin_id);
    }
}
