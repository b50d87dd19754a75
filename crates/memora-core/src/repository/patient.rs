//! Patient repository trait definition.

use memora_types::error::RepositoryError;
use memora_types::patient::{Patient, PatientId};

/// Repository trait for patient persistence.
///
/// Implementations live in memora-infra (e.g., SqlitePatientRepository).
pub trait PatientRepository: Send + Sync {
    /// Insert a new patient.
    ///
    /// Returns `RepositoryError::Conflict` when the auth user id is already taken.
    fn create(
        &self,
        patient: &Patient,
    ) -> impl std::future::Future<Output = Result<Patient, RepositoryError>> + Send;

    /// Insert or overwrite a patient keyed by its id (used by demo seeding).
    fn upsert(
        &self,
        patient: &Patient,
    ) -> impl std::future::Future<Output = Result<Patient, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &PatientId,
    ) -> impl std::future::Future<Output = Result<Option<Patient>, RepositoryError>> + Send;

    /// Record the remote agent provisioned for this patient.
    fn set_agent_id(
        &self,
        id: &PatientId,
        agent_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
