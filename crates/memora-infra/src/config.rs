//! Configuration loading for Memora.
//!
//! Non-secret settings come from `{data_dir}/config.toml` (missing or
//! malformed falls back to defaults), then environment overrides. Secrets
//! are only ever read from the environment and held as [`SecretString`].

use std::path::{Path, PathBuf};

use memora_types::config::MemoraConfig;
use secrecy::SecretString;
use uuid::Uuid;

pub const CONFIG_FILE: &str = "config.toml";

pub const DATA_DIR_ENV: &str = "MEMORA_DATA_DIR";
pub const DEEPGRAM_API_KEY_ENV: &str = "DEEPGRAM_API_KEY";
pub const LIVEKIT_API_KEY_ENV: &str = "LIVEKIT_API_KEY";
pub const LIVEKIT_API_SECRET_ENV: &str = "LIVEKIT_API_SECRET";
pub const LIVEKIT_URL_ENV: &str = "LIVEKIT_URL";
pub const LETTA_BASE_URL_ENV: &str = "LETTA_BASE_URL";
pub const LETTA_API_KEY_ENV: &str = "LETTA_API_KEY";
pub const SESSION_SECRET_ENV: &str = "MEMORA_SESSION_SECRET";
pub const DEMO_MODE_ENV: &str = "MEMORA_DEMO_MODE";
pub const DEMO_PATIENT_ID_ENV: &str = "MEMORA_DEMO_PATIENT_ID";

/// Read an environment variable, treating empty and non-Unicode values as unset.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `MEMORA_DATA_DIR`, else `~/.memora`.
pub fn resolve_data_dir(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memora")
}

/// Load `{data_dir}/config.toml` and apply environment overrides.
pub async fn load_config(data_dir: &Path) -> MemoraConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, env_lookup)
}

async fn read_config_file(data_dir: &Path) -> MemoraConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return MemoraConfig::default();
        }
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "failed to read config, using defaults");
            return MemoraConfig::default();
        }
    };

    match toml::from_str::<MemoraConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "failed to parse config, using defaults");
            MemoraConfig::default()
        }
    }
}

/// Environment values win over the file.
pub fn apply_env_overrides(mut config: MemoraConfig, lookup: impl Fn(&str) -> Option<String>) -> MemoraConfig {
    if let Some(url) = lookup(LIVEKIT_URL_ENV) {
        config.livekit.url = Some(url);
    }
    if let Some(url) = lookup(LETTA_BASE_URL_ENV) {
        config.letta.base_url = Some(url);
    }
    if let Some(value) = lookup(DEMO_MODE_ENV) {
        match parse_bool(&value) {
            Some(enabled) => config.demo_mode = enabled,
            None => tracing::warn!(value = %value, "ignoring invalid {DEMO_MODE_ENV}"),
        }
    }
    if let Some(value) = lookup(DEMO_PATIENT_ID_ENV) {
        match Uuid::parse_str(value.trim()) {
            Ok(id) => config.demo_patient_id = Some(id),
            Err(err) => tracing::warn!(value = %value, error = %err, "ignoring invalid {DEMO_PATIENT_ID_ENV}"),
        }
    }
    config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Provider credentials read from the environment.
#[derive(Debug, Default)]
pub struct ServiceSecrets {
    pub deepgram_api_key: Option<SecretString>,
    pub livekit_api_key: Option<SecretString>,
    pub livekit_api_secret: Option<SecretString>,
    pub letta_api_key: Option<SecretString>,
    pub session_secret: Option<SecretString>,
}

impl ServiceSecrets {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |key: &str| lookup(key).map(SecretString::from);
        Self {
            deepgram_api_key: secret(DEEPGRAM_API_KEY_ENV),
            livekit_api_key: secret(LIVEKIT_API_KEY_ENV),
            livekit_api_secret: secret(LIVEKIT_API_SECRET_ENV),
            letta_api_key: secret(LETTA_API_KEY_ENV),
            session_secret: secret(SESSION_SECRET_ENV),
        }
    }
}

/// Which integrations are usable, for startup logging. Never includes values.
pub fn configured_services(config: &MemoraConfig, secrets: &ServiceSecrets) -> Vec<&'static str> {
    let mut services = Vec::new();
    if secrets.deepgram_api_key.is_some() {
        services.push("deepgram");
    }
    if secrets.livekit_api_key.is_some() && secrets.livekit_api_secret.is_some() && config.livekit.url.is_some() {
        services.push("livekit");
    }
    if config.letta.base_url.is_some() {
        services.push("letta");
    }
    if secrets.session_secret.is_some() {
        services.push("sessions");
    }
    services
}
