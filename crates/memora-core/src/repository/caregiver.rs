//! Caregiver repository trait definition.

use memora_types::caregiver::{Caregiver, CaregiverId, LinkedCaregiver};
use memora_types::error::RepositoryError;
use memora_types::patient::{PatientId, UserId};

/// Repository trait for caregivers and their patient links.
pub trait CaregiverRepository: Send + Sync {
    /// Insert a new caregiver.
    ///
    /// Returns `RepositoryError::Conflict` when the auth user id is already taken.
    fn create(
        &self,
        caregiver: &Caregiver,
    ) -> impl std::future::Future<Output = Result<Caregiver, RepositoryError>> + Send;

    fn get_by_user_id(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Caregiver>, RepositoryError>> + Send;

    /// Link a caregiver to a patient. Linking an already-linked pair is a no-op.
    fn link(
        &self,
        caregiver_id: &CaregiverId,
        patient_id: &PatientId,
        relationship: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Whether the caregiver owning `user_id` is linked to the patient.
    fn is_linked(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> impl std::future::Future<Output = Result<Vec<LinkedCaregiver>, RepositoryError>> + Send;
}
