//! Session authentication extractors.
//!
//! The session token is read from:
//! - `Authorization: Bearer <token>` header
//! - the `__session` cookie set by the hosted auth provider
//!
//! Tokens are verified by the [`SessionVerifier`] held in [`AppState`].

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

use memora_core::auth::SessionVerifier;
use memora_types::error::AuthError;
use memora_types::patient::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// Cookie carrying the session token for browser callers.
pub const SESSION_COOKIE: &str = "__session";

/// Caller with a verified session. Rejects with 401 otherwise.
pub struct Authenticated(pub UserId);

/// Caller identity when a valid session is present. Never rejects.
pub struct MaybeAuthenticated(pub Option<UserId>);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(AuthError::Missing)?;
        match state.sessions.verify(&token) {
            Ok(user_id) => Ok(Authenticated(user_id)),
            Err(e) => {
                log_rejection(&e);
                Err(e.into())
            }
        }
    }
}

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(MaybeAuthenticated(None));
        };
        match state.sessions.verify(&token) {
            Ok(user_id) => Ok(MaybeAuthenticated(Some(user_id))),
            Err(e) => {
                log_rejection(&e);
                Ok(MaybeAuthenticated(None))
            }
        }
    }
}

/// A missing session secret is an operator problem; a bad token is the caller's.
fn rejection_level(e: &AuthError) -> tracing::Level {
    match e {
        AuthError::NotConfigured => tracing::Level::WARN,
        _ => tracing::Level::DEBUG,
    }
}

fn log_rejection(e: &AuthError) {
    if rejection_level(e) == tracing::Level::WARN {
        tracing::warn!("session token presented but MEMORA_SESSION_SECRET is not set");
    } else {
        tracing::debug!(error = %e, "rejected session token");
    }
}

/// Bearer header first, then the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    if let Some(token) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
