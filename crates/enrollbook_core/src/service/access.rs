//! Request gating on top of `AuthService`.
//!
//! # Responsibility
//! - Turn an `Authorization` header value into verified session claims.
//! - Enforce administrator and owner-or-administrator policies.
//!
//! # Invariants
//! - A missing or malformed header is `InvalidToken`, same as a bad token.
//! - Role checks read the current administrator flag, not a token claim.

use crate::error::ErrorKind;
use crate::model::user::UserId;
use crate::service::auth_service::{AuthError, AuthService};
use crate::service::token::SessionClaims;
use log::debug;
use std::sync::Arc;

const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("user {user_id} is not allowed to perform this operation")]
    Forbidden { user_id: UserId },
}

impl AccessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(err) => err.kind(),
            Self::Forbidden { .. } => ErrorKind::Forbidden,
        }
    }
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim).ok_or(AuthError::InvalidToken)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token)
}

#[derive(Debug, Clone)]
pub struct AccessControl {
    auth: Arc<AuthService>,
}

impl AccessControl {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }

    /// Requires any valid session.
    pub fn authenticate(&self, header: Option<&str>) -> Result<SessionClaims, AccessError> {
        let token = bearer_token(header)?;
        Ok(self.auth.validate_token(token)?)
    }

    /// Requires a valid session whose user is currently an administrator.
    pub fn authorize_admin(&self, header: Option<&str>) -> Result<SessionClaims, AccessError> {
        let claims = self.authenticate(header)?;
        if self.auth.is_admin(claims.uid)? {
            return Ok(claims);
        }
        debug!(
            "event=access_check module=service status=forbidden user_id={}",
            claims.uid
        );
        Err(AccessError::Forbidden {
            user_id: claims.uid,
        })
    }

    /// Requires the session user to be `owner_id` or an administrator.
    pub fn authorize_owner_or_admin(
        &self,
        header: Option<&str>,
        owner_id: UserId,
    ) -> Result<SessionClaims, AccessError> {
        let claims = self.authenticate(header)?;
        if claims.uid == owner_id || self.auth.is_admin(claims.uid)? {
            return Ok(claims);
        }
        debug!(
            "event=access_check module=service status=forbidden user_id={} owner_id={}",
            claims.uid, owner_id
        );
        Err(AccessError::Forbidden {
            user_id: claims.uid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::bearer_token;
    use crate::service::auth_service::AuthError;

    #[test]
    fn bearer_token_accepts_scheme_case_insensitively() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(Some("bearer   xyz ")), Ok("xyz"));
    }

    #[test]
    fn bearer_token_rejects_missing_or_malformed_headers() {
        for header in [None, Some(""), Some("Bearer"), Some("Bearer "), Some("Basic abc")] {
            assert_eq!(bearer_token(header), Err(AuthError::InvalidToken));
        }
    }
}
