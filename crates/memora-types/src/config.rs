//! Configuration types for Memora.
//!
//! `MemoraConfig` mirrors `config.toml` in the data directory. Every field has
//! a default so an empty or missing file is valid. Secrets (API keys, signing
//! secrets) are never part of this struct; they come from the environment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patient::DEMO_PATIENT_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoraConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Allow anonymous callers on the speech endpoints.
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,

    /// Override for the patient every identity may read.
    #[serde(default)]
    pub demo_patient_id: Option<Uuid>,

    #[serde(default)]
    pub deepgram: DeepgramSettings,

    #[serde(default)]
    pub livekit: LiveKitSettings,

    #[serde(default)]
    pub letta: LettaSettings,
}

fn default_demo_mode() -> bool {
    true
}

impl Default for MemoraConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            demo_mode: default_demo_mode(),
            demo_patient_id: None,
            deepgram: DeepgramSettings::default(),
            livekit: LiveKitSettings::default(),
            letta: LettaSettings::default(),
        }
    }
}

impl MemoraConfig {
    /// The effective demo patient id.
    pub fn demo_patient_id(&self) -> Uuid {
        self.demo_patient_id.unwrap_or(DEMO_PATIENT_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepgramSettings {
    #[serde(default = "default_deepgram_url")]
    pub base_url: String,
    /// Voice model for text-to-speech.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Lifetime of browser transcription tokens.
    #[serde(default = "default_deepgram_ttl")]
    pub token_ttl_secs: u32,
}

fn default_deepgram_url() -> String {
    "https://api.deepgram.com".to_string()
}

fn default_tts_model() -> String {
    "aura-asteria-en".to_string()
}

fn default_deepgram_ttl() -> u32 {
    60
}

impl Default for DeepgramSettings {
    fn default() -> Self {
        Self {
            base_url: default_deepgram_url(),
            tts_model: default_tts_model(),
            token_ttl_secs: default_deepgram_ttl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveKitSettings {
    /// Server URL handed to clients (`LIVEKIT_URL` overrides).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_livekit_ttl")]
    pub token_ttl_secs: u64,
}

fn default_livekit_ttl() -> u64 {
    6 * 60 * 60
}

impl Default for LiveKitSettings {
    fn default() -> Self {
        Self {
            url: None,
            token_ttl_secs: default_livekit_ttl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LettaSettings {
    /// Agent service URL (`LETTA_BASE_URL` overrides). Unset disables provisioning.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_letta_model")]
    pub model: String,
    #[serde(default = "default_letta_embedding")]
    pub embedding: String,
    #[serde(default = "default_letta_timeout")]
    pub timeout_secs: u64,
}

fn default_letta_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_letta_embedding() -> String {
    "openai/text-embedding-3-small".to_string()
}

fn default_letta_timeout() -> u64 {
    30
}

impl Default for LettaSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: default_letta_model(),
            embedding: default_letta_embedding(),
            timeout_secs: default_letta_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = MemoraConfig::default();
        assert!(config.demo_mode);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.demo_patient_id(), DEMO_PATIENT_ID);
        assert_eq!(config.livekit.token_ttl_secs, 21_600);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: MemoraConfig = toml::from_str("").unwrap();
        assert_eq!(config, MemoraConfig::default());
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
demo_mode = false
demo_patient_id = "0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b"

[server]
port = 8080

[deepgram]
tts_model = "aura-luna-en"

[letta]
base_url = "http://localhost:8283"
"#;
        let config: MemoraConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.demo_mode);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.deepgram.tts_model, "aura-luna-en");
        assert_eq!(config.deepgram.token_ttl_secs, 60);
        assert_eq!(config.letta.base_url.as_deref(), Some("http://localhost:8283"));
        assert_eq!(
            config.demo_patient_id().to_string(),
            "0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b"
        );
    }
}
