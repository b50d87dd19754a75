//! HTTP client for Deepgram: temporary transcription grants and text-to-speech.
//!
//! The long-lived API key stays on the server. Browsers receive short-lived
//! grant tokens instead.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use memora_core::speech::{SpeechProvider, SpeechToken};
use memora_types::config::DeepgramSettings;
use memora_types::error::SpeechError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct GrantResponse {
    access_token: String,
    expires_in: Option<u64>,
}

pub struct DeepgramClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    tts_model: String,
    token_ttl_secs: u32,
}

impl DeepgramClient {
    /// Fails only when the HTTP client (TLS backend) cannot be initialized.
    pub fn new(settings: &DeepgramSettings, api_key: Option<SecretString>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            tts_model: settings.tts_model.clone(),
            token_ttl_secs: settings.token_ttl_secs,
        })
    }

    fn api_key(&self) -> Result<&str, SpeechError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or(SpeechError::NotConfigured)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SpeechError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

impl SpeechProvider for DeepgramClient {
    async fn grant_token(&self) -> Result<SpeechToken, SpeechError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(format!("{}/v1/auth/grant", self.base_url))
            .header("Authorization", format!("Token {api_key}"))
            .json(&json!({ "ttl_seconds": self.token_ttl_secs }))
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let grant: GrantResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SpeechError::Deserialization(e.to_string()))?;

        Ok(SpeechToken {
            token: grant.access_token,
            expires_in: grant.expires_in.unwrap_or(u64::from(self.token_ttl_secs)),
        })
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(format!("{}/v1/speak", self.base_url))
            .query(&[("model", self.tts_model.as_str()), ("encoding", "mp3")])
            .header("Authorization", format!("Token {api_key}"))
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let audio = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        tracing::debug!(chars = text.chars().count(), bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}
