//! Read-side patient service backing the caregiver dashboard.
//!
//! Every method runs the access check first, so a caller only ever sees
//! data for patients they may read.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use memora_types::care::{DailyActivity, MedicationWithDoses, SleepLog};
use memora_types::caregiver::LinkedCaregiver;
use memora_types::error::{PatientError, RepositoryError};
use memora_types::metrics::BehavioralMetrics;
use memora_types::patient::{Patient, PatientId, UserId};

use crate::repository::care::CareRepository;
use crate::repository::caregiver::CaregiverRepository;
use crate::repository::metrics::MetricsRepository;
use crate::repository::patient::PatientRepository;
use crate::service::access::{check_patient_access, AccessDecision};

pub const DEFAULT_HISTORY_DAYS: u32 = 7;
pub const MAX_HISTORY_DAYS: u32 = 90;

/// Clamp a requested history window to `1..=MAX_HISTORY_DAYS`.
pub fn history_days(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, MAX_HISTORY_DAYS)
}

/// Patient record with its linked caregivers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub caregivers: Vec<LinkedCaregiver>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    /// Most recent day, `None` when nothing has been computed yet.
    pub metrics: Option<BehavioralMetrics>,
    /// Most recent days, newest first.
    pub history: Vec<BehavioralMetrics>,
}

pub struct PatientService<P, C, M, K>
where
    P: PatientRepository,
    C: CaregiverRepository,
    M: MetricsRepository,
    K: CareRepository,
{
    patients: P,
    caregivers: C,
    metrics: M,
    care: K,
    demo_patient_id: PatientId,
}

fn storage(e: RepositoryError) -> PatientError {
    PatientError::StorageError(e.to_string())
}

impl<P, C, M, K> PatientService<P, C, M, K>
where
    P: PatientRepository,
    C: CaregiverRepository,
    M: MetricsRepository,
    K: CareRepository,
{
    pub fn new(patients: P, caregivers: C, metrics: M, care: K, demo_patient_id: PatientId) -> Self {
        Self {
            patients,
            caregivers,
            metrics,
            care,
            demo_patient_id,
        }
    }

    pub fn demo_patient_id(&self) -> &PatientId {
        &self.demo_patient_id
    }

    pub async fn check_access(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
    ) -> Result<AccessDecision, PatientError> {
        check_patient_access(
            &self.patients,
            &self.caregivers,
            &self.demo_patient_id,
            user_id,
            patient_id,
        )
        .await
    }

    async fn authorized(&self, user_id: &UserId, patient_id: &PatientId) -> Result<Patient, PatientError> {
        self.check_access(user_id, patient_id).await?.into_patient()
    }

    pub async fn get_patient(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
    ) -> Result<PatientDetail, PatientError> {
        let patient = self.authorized(user_id, patient_id).await?;
        let caregivers = self
            .caregivers
            .list_for_patient(&patient.id)
            .await
            .map_err(storage)?;
        Ok(PatientDetail { patient, caregivers })
    }

    pub async fn behavioral_metrics(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
        days: Option<u32>,
    ) -> Result<MetricsSummary, PatientError> {
        let patient = self.authorized(user_id, patient_id).await?;
        let history = self
            .metrics
            .recent(&patient.id, history_days(days))
            .await
            .map_err(storage)?;
        // `recent` is newest first, so the head is the latest day.
        let metrics = history.first().cloned();
        Ok(MetricsSummary { metrics, history })
    }

    /// Active medications with their doses scheduled on `day` (UTC).
    pub async fn medications(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<Vec<MedicationWithDoses>, PatientError> {
        let patient = self.authorized(user_id, patient_id).await?;
        let medications = self
            .care
            .list_active_medications(&patient.id)
            .await
            .map_err(storage)?;

        let from = day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let to = from + Duration::days(1);
        let doses = self
            .care
            .doses_between(&patient.id, from, to)
            .await
            .map_err(storage)?;

        Ok(medications
            .into_iter()
            .map(|medication| {
                let doses = doses
                    .iter()
                    .filter(|d| d.medication_id == medication.id)
                    .cloned()
                    .collect();
                MedicationWithDoses { medication, doses }
            })
            .collect())
    }

    pub async fn activities(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
        days: Option<u32>,
    ) -> Result<Vec<DailyActivity>, PatientError> {
        let patient = self.authorized(user_id, patient_id).await?;
        let since = Utc::now() - Duration::days(i64::from(history_days(days)));
        self.care
            .activities_since(&patient.id, since)
            .await
            .map_err(storage)
    }

    pub async fn sleep_logs(
        &self,
        user_id: &UserId,
        patient_id: &PatientId,
        days: Option<u32>,
    ) -> Result<Vec<SleepLog>, PatientError> {
        let patient = self.authorized(user_id, patient_id).await?;
        let since = Utc::now().date_naive() - Duration::days(i64::from(history_days(days)));
        self.care
            .sleep_since(&patient.id, since)
            .await
            .map_err(storage)
    }
}
