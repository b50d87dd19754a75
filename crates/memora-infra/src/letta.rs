//! HTTP client for the Letta agent service.
//!
//! Creates one stateful agent per patient with `human` and `persona` memory
//! blocks. Self-hosted servers run without an API key, in which case the
//! `Authorization` header is omitted. No retries.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use memora_core::agent::{self, AgentProvisioner, HUMAN_BLOCK, PERSONA_BLOCK};
use memora_types::config::LettaSettings;
use memora_types::error::AgentError;
use memora_types::patient::Patient;

#[derive(Debug, Serialize)]
struct MemoryBlock {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct CreateAgentRequest {
    name: String,
    memory_blocks: Vec<MemoryBlock>,
    model: String,
    embedding: String,
}

#[derive(Debug, Deserialize)]
struct AgentResponse {
    id: String,
}

pub struct LettaClient {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<SecretString>,
    model: String,
    embedding: String,
}

impl LettaClient {
    /// Fails only when the HTTP client (TLS backend) cannot be initialized.
    pub fn new(settings: &LettaSettings, api_key: Option<SecretString>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings
                .base_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key,
            model: settings.model.clone(),
            embedding: settings.embedding.clone(),
        })
    }

    fn create_request(&self, patient: &Patient) -> CreateAgentRequest {
        CreateAgentRequest {
            name: agent::agent_name(patient),
            memory_blocks: vec![
                MemoryBlock {
                    label: HUMAN_BLOCK,
                    value: agent::human_block(patient),
                },
                MemoryBlock {
                    label: PERSONA_BLOCK,
                    value: agent::persona_block(patient),
                },
            ],
            model: self.model.clone(),
            embedding: self.embedding.clone(),
        }
    }
}

impl AgentProvisioner for LettaClient {
    async fn provision(&self, patient: &Patient) -> Result<String, AgentError> {
        let base_url = self.base_url.as_deref().ok_or(AgentError::NotConfigured)?;

        let mut request = self
            .client
            .post(format!("{base_url}/v1/agents/"))
            .json(&self.create_request(patient));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let agent: AgentResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Deserialization(e.to_string()))?;

        tracing::info!(patient_id = %patient.id, agent_id = %agent.id, "agent provisioned");
        Ok(agent.id)
    }
}
