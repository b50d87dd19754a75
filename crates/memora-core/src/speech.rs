//! Speech provider port: short-lived transcription tokens and text-to-speech.

use serde::Serialize;

use memora_types::error::{SpeechError, ValidationError};

/// Longest text accepted for a single synthesis request.
pub const MAX_SPEECH_CHARS: usize = 2000;

/// Short-lived credential a browser uses to stream audio for transcription.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechToken {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

pub trait SpeechProvider: Send + Sync {
    /// Mint a temporary transcription token from the server-held key.
    fn grant_token(
        &self,
    ) -> impl std::future::Future<Output = Result<SpeechToken, SpeechError>> + Send;

    /// Synthesize `text` and return MP3 bytes.
    fn synthesize(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, SpeechError>> + Send;
}

/// Validate the `text` field of a synthesis request.
pub fn validate_speech_text(text: Option<&str>) -> Result<&str, ValidationError> {
    let text = text.ok_or_else(|| ValidationError::new("text", "text is required"))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("text", "text cannot be empty"));
    }
    if trimmed.chars().count() > MAX_SPEECH_CHARS {
        return Err(ValidationError::new(
            "text",
            format!("text must be at most {MAX_SPEECH_CHARS} characters"),
        ));
    }
    Ok(trimmed)
}
