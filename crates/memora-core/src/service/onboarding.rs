//! Onboarding service.
//!
//! received -> validated -> persisted -> (agent-provisioned | agent-failed) -> responded
//!
//! Validation happens before this service is called (the payload arrives as
//! an [`OnboardingRequest`]). Agent provisioning is best-effort: a failure is
//! logged and reported as a warning, never as an error.

use chrono::Utc;

use memora_types::caregiver::{Caregiver, CaregiverId};
use memora_types::error::{OnboardingError, RepositoryError};
use memora_types::onboarding::{NewCaregiver, NewPatient, OnboardingOutcome, OnboardingRequest, Role};
use memora_types::patient::{Patient, PatientId, UserId};

use crate::agent::AgentProvisioner;
use crate::repository::caregiver::CaregiverRepository;
use crate::repository::patient::PatientRepository;

/// Warning returned when the patient was saved but has no agent yet.
pub const AGENT_PROVISIONING_WARNING: &str =
    "Patient profile created, but the conversation companion could not be set up. It will need to be provisioned later.";

pub struct OnboardingService<P: PatientRepository, C: CaregiverRepository, A: AgentProvisioner> {
    patients: P,
    caregivers: C,
    agents: A,
}

impl<P: PatientRepository, C: CaregiverRepository, A: AgentProvisioner> OnboardingService<P, C, A> {
    pub fn new(patients: P, caregivers: C, agents: A) -> Self {
        Self {
            patients,
            caregivers,
            agents,
        }
    }

    /// Create the account record for `user_id` and, for patients, its agent.
    pub async fn onboard(
        &self,
        user_id: &UserId,
        request: OnboardingRequest,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        match request {
            OnboardingRequest::Patient(new) => self.onboard_patient(user_id, new).await,
            OnboardingRequest::Caregiver(new) => self.onboard_caregiver(user_id, new).await,
        }
    }

    async fn onboard_patient(
        &self,
        user_id: &UserId,
        new: NewPatient,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        let now = Utc::now();
        let patient = Patient {
            id: PatientId::new(),
            user_id: user_id.clone(),
            name: new.name,
            age: new.age,
            diagnosis_stage: new.diagnosis_stage,
            location: new.location,
            preferred_name: new.preferred_name,
            letta_agent_id: None,
            created_at: now,
            updated_at: now,
        };

        let patient = self
            .patients
            .create(&patient)
            .await
            .map_err(|e| map_create_error(e, user_id))?;

        tracing::info!(patient_id = %patient.id, user_id = %user_id, "patient onboarded");

        let agent_id = self.provision_agent(&patient).await;
        let warning = agent_id
            .is_none()
            .then(|| AGENT_PROVISIONING_WARNING.to_string());

        Ok(OnboardingOutcome {
            success: true,
            user_id: patient.id.to_string(),
            role: Role::Patient,
            letta_agent_id: Some(agent_id),
            warning,
        })
    }

    /// Provision the agent and store its id. Failures are logged here and
    /// collapsed to `None`.
    async fn provision_agent(&self, patient: &Patient) -> Option<String> {
        let agent_id = match self.agents.provision(patient).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(patient_id = %patient.id, error = %e, "agent provisioning failed");
                return None;
            }
        };

        if let Err(e) = self.patients.set_agent_id(&patient.id, &agent_id).await {
            tracing::warn!(
                patient_id = %patient.id,
                agent_id = %agent_id,
                error = %e,
                "failed to store provisioned agent id"
            );
            return None;
        }

        tracing::info!(patient_id = %patient.id, agent_id = %agent_id, "agent provisioned");
        Some(agent_id)
    }

    async fn onboard_caregiver(
        &self,
        user_id: &UserId,
        new: NewCaregiver,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        let now = Utc::now();
        let caregiver = Caregiver {
            id: CaregiverId::new(),
            user_id: user_id.clone(),
            name: new.name,
            email: new.email,
            created_at: now,
            updated_at: now,
        };

        let caregiver = self
            .caregivers
            .create(&caregiver)
            .await
            .map_err(|e| map_create_error(e, user_id))?;

        tracing::info!(caregiver_id = %caregiver.id, user_id = %user_id, "caregiver onboarded");

        Ok(OnboardingOutcome {
            success: true,
            user_id: caregiver.id.to_string(),
            role: Role::Caregiver,
            letta_agent_id: None,
            warning: None,
        })
    }
}

fn map_create_error(e: RepositoryError, user_id: &UserId) -> OnboardingError {
    match e {
        RepositoryError::Conflict(_) => OnboardingError::AlreadyOnboarded(user_id.to_string()),
        other => OnboardingError::StorageError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{InMemoryCaregivers, InMemoryPatients, MockProvisioner};
    use memora_types::onboarding::NewPatient;

    fn new_patient() -> OnboardingRequest {
        OnboardingRequest::Patient(NewPatient {
            name: "Rose Tyler".to_string(),
            age: 77,
            diagnosis_stage: None,
            location: None,
            preferred_name: Some("Rosie".to_string()),
        })
    }

    fn new_caregiver() -> OnboardingRequest {
        OnboardingRequest::Caregiver(NewCaregiver {
            name: "Sam".to_string(),
            email: Some("sam@example.com".to_string()),
        })
    }

    #[tokio::test]
    async fn test_patient_with_agent() {
        let service = OnboardingService::new(
            InMemoryPatients::default(),
            InMemoryCaregivers::default(),
            MockProvisioner { agent_id: Some("agent-123") },
        );

        let outcome = service.onboard(&UserId::new("user_1"), new_patient()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.role, Role::Patient);
        assert_eq!(outcome.letta_agent_id, Some(Some("agent-123".to_string())));
        assert!(outcome.warning.is_none());

        let stored = service.patients.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].letta_agent_id.as_deref(), Some("agent-123"));
        assert_eq!(outcome.user_id, stored[0].id.to_string());
    }

    #[tokio::test]
    async fn test_agent_failure_is_a_warning() {
        let service = OnboardingService::new(
            InMemoryPatients::default(),
            InMemoryCaregivers::default(),
            MockProvisioner { agent_id: None },
        );

        let outcome = service.onboard(&UserId::new("user_1"), new_patient()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.letta_agent_id, Some(None));
        assert!(!outcome.warning.unwrap().is_empty());

        // The patient row still exists, without an agent.
        let stored = service.patients.all();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].letta_agent_id.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_patient_conflicts() {
        let service = OnboardingService::new(
            InMemoryPatients::default(),
            InMemoryCaregivers::default(),
            MockProvisioner { agent_id: Some("agent-1") },
        );
        let user = UserId::new("user_1");

        service.onboard(&user, new_patient()).await.unwrap();
        let err = service.onboard(&user, new_patient()).await.unwrap_err();
        assert!(matches!(err, OnboardingError::AlreadyOnboarded(ref u) if u == "user_1"));
    }

    #[tokio::test]
    async fn test_caregiver_skips_provisioning() {
        let service = OnboardingService::new(
            InMemoryPatients::default(),
            InMemoryCaregivers::default(),
            MockProvisioner { agent_id: None },
        );

        let outcome = service.onboard(&UserId::new("user_c"), new_caregiver()).await.unwrap();
        assert_eq!(outcome.role, Role::Caregiver);
        assert!(outcome.letta_agent_id.is_none());
        assert!(outcome.warning.is_none());
        assert_eq!(service.caregivers.all().len(), 1);

        let err = service
            .onboard(&UserId::new("user_c"), new_caregiver())
            .await
            .unwrap_err();
        assert!(matches!(err, OnboardingError::AlreadyOnboarded(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_conflict() {
        let patients = InMemoryPatients {
            fail_writes: true,
            ..Default::default()
        };
        let service = OnboardingService::new(
            patients,
            InMemoryCaregivers::default(),
            MockProvisioner { agent_id: Some("agent-1") },
        );

        let err = service.onboard(&UserId::new("user_1"), new_patient()).await.unwrap_err();
        assert!(matches!(err, OnboardingError::StorageError(_)));
    }
}
