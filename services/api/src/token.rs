//! services/api/src/token.rs
//!
//! Signed bearer tokens carried in cookies. A token is
//! `base64url(claims JSON) . base64url(hmac-sha256(payload))`; verification
//! recomputes the MAC and then checks the `exp` claim.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use adoptme_core::domain::{Role, User};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
}

/// The user subset placed in the `auth_token` cookie at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_user(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Demo-only claims for the unprotected flow: the whole user record, password
/// hash included. Kept deliberately insecure, do not reuse elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnprotectedClaims {
    #[serde(flatten)]
    pub user: User,
    pub iat: i64,
    pub exp: i64,
}

impl UnprotectedClaims {
    pub fn for_user(user: User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Serializes and signs a claims value with the given key.
pub fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, serde_json::Error> {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// Verifies the MAC and the `exp` claim, then deserializes the payload.
pub fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, TokenError> {
    let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| TokenError::BadSignature)?;

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let value: serde_json::Value =
        serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

    match value.get("exp").and_then(|v| v.as_i64()) {
        Some(exp) if exp >= Utc::now().timestamp() => {}
        _ => return Err(TokenError::Expired),
    }

    serde_json::from_value(value).map_err(|_| TokenError::Malformed)
}
