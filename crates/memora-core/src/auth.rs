//! Session verification port.
//!
//! The hosted auth provider issues session tokens; a verifier turns one into
//! the caller's `UserId` or explains why it cannot.

use memora_types::error::AuthError;
use memora_types::patient::UserId;

pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}
