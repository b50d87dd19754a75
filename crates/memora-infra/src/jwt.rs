//! Compact HS256 JSON Web Tokens.
//!
//! Used both to verify session tokens and to mint realtime room tokens.
//! Signatures are HMAC-SHA256 over `base64url(header).base64url(payload)`,
//! compared in constant time.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use memora_types::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, serde::Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("failed to encode claims: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid signing key")]
    InvalidKey,
}

/// Serialize `claims` and sign them with `secret`.
pub fn sign<T: Serialize>(claims: &T, secret: &[u8]) -> Result<String, SignError> {
    let header = serde_json::to_vec(&Header {
        alg: ALGORITHM.to_string(),
        typ: Some("JWT".to_string()),
    })?;
    let payload = serde_json::to_vec(claims)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignError::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Check the algorithm and signature, then decode the claims.
///
/// Time-based claims are left to the caller.
pub fn verify<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T, AuthError> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::Malformed);
    };

    let header: Header = decode_json(header_b64)?;
    if header.alg != ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm(header.alg));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::Malformed)?;
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::NotConfigured)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::BadSignature)?;

    decode_json(payload_b64)
}

fn decode_json<T: DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}
