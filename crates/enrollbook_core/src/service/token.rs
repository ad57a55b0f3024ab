//! Signed session tokens.
//!
//! Tokens use the compact JWS layout `header.claims.signature`, each part
//! base64url without padding, signed with Ed25519 (`alg = EdDSA`).
//!
//! # Invariants
//! - Verification checks structure, algorithm, signature and expiry, in that
//!   order, and never trusts claims before the signature passes.
//! - A token is valid while `now < exp`.

use crate::config::SIGNING_SEED_LEN;
use crate::model::user::{User, UserId};
use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use uuid::Uuid;

const TOKEN_ALGORITHM: &str = "EdDSA";
const TOKEN_TYPE: &str = "JWT";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub uid: UserId,
    pub login: String,
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub phone: String,
    pub email: String,
    /// Issue instant, Unix seconds.
    pub iat: i64,
    /// Expiry instant, Unix seconds.
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
}

impl SessionClaims {
    pub fn for_user(user: &User, issued_at: i64, ttl: Duration) -> Self {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            uid: user.id,
            login: user.login.clone(),
            name: user.profile.name.clone(),
            surname: user.profile.surname.clone(),
            patronymic: user.profile.patronymic.clone(),
            phone: user.profile.phone.clone(),
            email: user.profile.email.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: Uuid::new_v4(),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Reason a token was rejected. Callers outside this module only ever see
/// `AuthError::InvalidToken`; the detail is for debug logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("unsupported token algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired at {exp}, now {now}")]
    Expired { exp: i64, now: i64 },
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and verifies session tokens with one Ed25519 key pair.
pub struct TokenSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl TokenSigner {
    /// Derives the key pair from a fixed seed so tokens survive restarts.
    pub fn from_seed(seed: &[u8; SIGNING_SEED_LEN]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Generates a random key pair. Tokens die with the process.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };
        let header_part = encode_json(&header)?;
        let claims_part = encode_json(claims)?;
        let signing_input = format!("{header_part}.{claims_part}");
        let signature = self.signing_key.sign(signing_input.as_bytes());
        let signature_part = Base64UrlUnpadded::encode_string(&signature.to_bytes());
        Ok(format!("{signing_input}.{signature_part}"))
    }

    /// Verifies `token` and returns its claims when still valid at `now`.
    pub fn verify(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_part), Some(claims_part), Some(signature_part), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected three dot-separated parts"));
        };

        let header: TokenHeader = decode_json(header_part)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature_bytes = Base64UrlUnpadded::decode_vec(signature_part)
            .map_err(|_| TokenError::Malformed("signature is not base64url"))?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|_| TokenError::Malformed("signature has wrong length"))?;
        let signed_len = header_part.len() + 1 + claims_part.len();
        let signing_input = token
            .get(..signed_len)
            .ok_or(TokenError::Malformed("truncated signing input"))?;
        self.verifying_key
            .verify_strict(signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: SessionClaims = decode_json(claims_part)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                exp: claims.exp,
                now,
            });
        }
        Ok(claims)
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

impl Debug for TokenSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("verifying_key", &hex::encode(self.verifying_key.as_bytes()))
            .finish()
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let bytes = serde_json::to_vec(value).map_err(|err| TokenError::Encoding(err.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

fn decode_json<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(part)
        .map_err(|_| TokenError::Malformed("segment is not base64url"))?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed("segment is not valid JSON"))
}
