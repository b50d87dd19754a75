use thiserror::Error;

/// A payload field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Path of the offending field (e.g. "age", "email", "body").
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from repository operations (used by trait definitions in memora-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from reading patient data.
#[derive(Debug, Error)]
pub enum PatientError {
    #[error("patient not found")]
    NotFound,

    #[error("access denied")]
    Forbidden,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from onboarding a new account.
#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("user '{0}' is already onboarded")]
    AlreadyOnboarded(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from the remote agent-memory service.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent service is not configured")]
    NotConfigured,

    #[error("agent request failed: {0}")]
    Request(String),

    #[error("agent API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse agent response: {0}")]
    Deserialization(String),
}

/// Errors from the speech provider (transcription tokens, synthesis).
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech provider is not configured")]
    NotConfigured,

    #[error("speech request failed: {0}")]
    Request(String),

    #[error("speech API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse speech response: {0}")]
    Deserialization(String),
}

/// Errors from minting room-join tokens.
#[derive(Debug, Error)]
pub enum RoomTokenError {
    #[error("room service is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("failed to sign room token: {0}")]
    Signing(String),
}

/// Errors from verifying a session token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing session token")]
    Missing,

    #[error("session verification is not configured")]
    NotConfigured,

    #[error("malformed session token")]
    Malformed,

    #[error("unsupported token algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("invalid token signature")]
    BadSignature,

    #[error("session token expired")]
    Expired,

    #[error("session token not yet valid")]
    NotYetValid,
}
