//! Care record repository trait definition (medications, doses, activities, sleep).

use chrono::{DateTime, NaiveDate, Utc};
use memora_types::care::{DailyActivity, Medication, MedicationDose, SleepLog};
use memora_types::error::RepositoryError;
use memora_types::patient::PatientId;

pub trait CareRepository: Send + Sync {
    fn list_active_medications(
        &self,
        patient_id: &PatientId,
    ) -> impl std::future::Future<Output = Result<Vec<Medication>, RepositoryError>> + Send;

    /// Doses for the patient's medications scheduled in `[from, to)`, oldest first.
    fn doses_between(
        &self,
        patient_id: &PatientId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<MedicationDose>, RepositoryError>> + Send;

    /// Activities started at or after `since`, newest first.
    fn activities_since(
        &self,
        patient_id: &PatientId,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<DailyActivity>, RepositoryError>> + Send;

    /// Sleep logs for nights on or after `since`, newest first.
    fn sleep_since(
        &self,
        patient_id: &PatientId,
        since: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<SleepLog>, RepositoryError>> + Send;

    /// Insert or replace by id.
    fn upsert_medication(
        &self,
        medication: &Medication,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert or replace by id.
    fn upsert_dose(
        &self,
        dose: &MedicationDose,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert or replace by id.
    fn upsert_activity(
        &self,
        activity: &DailyActivity,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert or replace by `(patient_id, night_of)`.
    fn upsert_sleep_log(
        &self,
        log: &SleepLog,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
