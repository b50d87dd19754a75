//! Remote conversational agent provisioning (port).
//!
//! Each patient gets one stateful agent with persistent memory blocks. The
//! agent service itself lives outside this process; infra provides the HTTP
//! implementation.

use memora_types::error::AgentError;
use memora_types::patient::Patient;

/// Label of the memory block describing the patient.
pub const HUMAN_BLOCK: &str = "human";
/// Label of the memory block describing the agent's own persona.
pub const PERSONA_BLOCK: &str = "persona";

/// Creates the remote agent for a newly onboarded patient.
pub trait AgentProvisioner: Send + Sync {
    /// Provision an agent and return its remote id.
    fn provision(
        &self,
        patient: &Patient,
    ) -> impl std::future::Future<Output = Result<String, AgentError>> + Send;
}

/// Agent name derived from the patient record.
pub fn agent_name(patient: &Patient) -> String {
    format!("memora-patient-{}", patient.id)
}

/// Initial contents of the `human` memory block.
pub fn human_block(patient: &Patient) -> String {
    let mut lines = vec![
        format!("Name: {}", patient.name),
        format!("Preferred name: {}", patient.display_name()),
        format!("Age: {}", patient.age),
    ];
    if let Some(stage) = &patient.diagnosis_stage {
        lines.push(format!("Diagnosis stage: {stage}"));
    }
    if let Some(location) = &patient.location {
        lines.push(format!("Lives at: {location}"));
    }
    lines.join("\n")
}

/// Initial contents of the `persona` memory block.
pub fn persona_block(patient: &Patient) -> String {
    format!(
        "You are Memora, a warm and patient companion for {name}. Speak in short, \
         simple sentences and ask one question at a time. Never correct {name} harshly; \
         gently remind them of people, places and routines they care about. Note any \
         new details they share so you can bring them up again later.",
        name = patient.display_name()
    )
}
