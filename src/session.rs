//! Session admission: token expiry decoding and the navigation guard.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};

/// Claims embedded in the bearer token payload.
///
/// Decoded without signature verification: the server re-validates every
/// request independently, so this check only short-circuits navigation
/// with a credential that cannot possibly be accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry (unix timestamp).
    pub exp: i64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl TokenClaims {
    /// Expiry as a UTC instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Decode the claims segment of a JWT-shaped bearer token.
///
/// Accepts `header.payload.signature`; only the payload is read.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::token("token is not in header.payload.signature form"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AppError::token(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::token(format!("payload is not a claims object: {e}")))
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Navigation proceeds unmodified.
    Allow,
    /// Navigation is redirected to the contained login path.
    Redirect(String),
}

/// Navigation guard for the protected path prefix.
///
/// `admit` is a pure decision over (path, token, now); it never touches
/// the credential store, so an expired token stays put until an
/// explicit logout.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    login_path: String,
    protected_prefix: String,
}

impl SessionGuard {
    pub fn new(login_path: impl Into<String>, protected_prefix: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            protected_prefix: protected_prefix.into(),
        }
    }

    /// Decide whether navigation to `path` may proceed.
    ///
    /// Undecodable tokens are treated the same as absent ones.
    pub fn admit(&self, path: &str, token: Option<&str>, now: DateTime<Utc>) -> Admission {
        if !path.starts_with(&self.protected_prefix) {
            return Admission::Allow;
        }

        let Some(token) = token else {
            debug!("No credential for {path}, redirecting to {}", self.login_path);
            return Admission::Redirect(self.login_path.clone());
        };

        match decode_claims(token) {
            Ok(claims) if !claims.is_expired(now) => Admission::Allow,
            Ok(_) => {
                debug!("Credential expired, redirecting to {}", self.login_path);
                Admission::Redirect(self.login_path.clone())
            }
            Err(e) => {
                debug!("Credential undecodable ({e}), redirecting to {}", self.login_path);
                Admission::Redirect(self.login_path.clone())
            }
        }
    }
}
