//! Session token verification against the shared signing secret.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use memora_core::auth::SessionVerifier;
use memora_types::error::AuthError;
use memora_types::patient::UserId;

use crate::jwt::{self, SignError};

/// Clock skew tolerated on `exp` and `nbf`.
pub const DEFAULT_LEEWAY_SECS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

pub struct HmacSessionVerifier {
    secret: Option<SecretString>,
    leeway_secs: i64,
}

impl HmacSessionVerifier {
    /// `None` rejects every token with [`AuthError::NotConfigured`].
    pub fn new(secret: Option<SecretString>) -> Self {
        Self {
            secret,
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    fn check_times(&self, claims: &SessionClaims, now: i64) -> Result<(), AuthError> {
        if now > claims.exp.saturating_add(self.leeway_secs) {
            return Err(AuthError::Expired);
        }
        if let Some(nbf) = claims.nbf {
            if now.saturating_add(self.leeway_secs) < nbf {
                return Err(AuthError::NotYetValid);
            }
        }
        Ok(())
    }
}

impl SessionVerifier for HmacSessionVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let secret = self.secret.as_ref().ok_or(AuthError::NotConfigured)?;
        let claims: SessionClaims = jwt::verify(token, secret.expose_secret().as_bytes())?;

        self.check_times(&claims, Utc::now().timestamp())?;

        let sub = claims.sub.trim();
        if sub.is_empty() {
            return Err(AuthError::Malformed);
        }
        Ok(UserId::new(sub))
    }
}

/// Mint a session token for `user_id` valid for `ttl_secs`.
pub fn issue_session_token(secret: &SecretString, user_id: &str, ttl_secs: i64) -> Result<String, SignError> {
    let now = Utc::now().timestamp();
    jwt::sign(
        &SessionClaims {
            sub: user_id.to_string(),
            exp: now.saturating_add(ttl_secs),
            nbf: None,
            iat: Some(now),
        },
        secret.expose_secret().as_bytes(),
    )
}
