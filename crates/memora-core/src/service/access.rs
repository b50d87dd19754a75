//! Patient access authorization.
//!
//! Checked in order, first match wins:
//! 1. Own record (`patient.user_id == caller`) -> allow
//! 2. Demo patient (`patient.id == demo id`) -> allow
//! 3. Linked caregiver (caller is a caregiver linked to the patient) -> allow
//! 4. Default -> deny
//!
//! A missing patient is reported separately so callers can answer 404
//! rather than 403.

use memora_types::error::PatientError;
use memora_types::patient::{Patient, PatientId, UserId};

use crate::repository::caregiver::CaregiverRepository;
use crate::repository::patient::PatientRepository;

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    OwnRecord,
    DemoPatient,
    LinkedCaregiver,
}

/// Result of an authorization check.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Allowed { patient: Patient, reason: AccessReason },
    Denied,
    NotFound,
}

impl AccessDecision {
    /// The patient when access was granted, else the matching error.
    pub fn into_patient(self) -> Result<Patient, PatientError> {
        match self {
            AccessDecision::Allowed { patient, .. } => Ok(patient),
            AccessDecision::Denied => Err(PatientError::Forbidden),
            AccessDecision::NotFound => Err(PatientError::NotFound),
        }
    }
}

/// Decide whether `user_id` may read `patient_id`. Read-only.
pub async fn check_patient_access<P, C>(
    patients: &P,
    caregivers: &C,
    demo_patient_id: &PatientId,
    user_id: &UserId,
    patient_id: &PatientId,
) -> Result<AccessDecision, PatientError>
where
    P: PatientRepository,
    C: CaregiverRepository,
{
    let Some(patient) = patients
        .get_by_id(patient_id)
        .await
        .map_err(|e| PatientError::StorageError(e.to_string()))?
    else {
        return Ok(AccessDecision::NotFound);
    };

    if &patient.user_id == user_id {
        return Ok(AccessDecision::Allowed {
            patient,
            reason: AccessReason::OwnRecord,
        });
    }

    if &patient.id == demo_patient_id {
        return Ok(AccessDecision::Allowed {
            patient,
            reason: AccessReason::DemoPatient,
        });
    }

    let linked = caregivers
        .is_linked(user_id, patient_id)
        .await
        .map_err(|e| PatientError::StorageError(e.to_string()))?;
    if linked {
        return Ok(AccessDecision::Allowed {
            patient,
            reason: AccessReason::LinkedCaregiver,
        });
    }

    tracing::debug!(user_id = %user_id, patient_id = %patient_id, "patient access denied");
    Ok(AccessDecision::Denied)
}
