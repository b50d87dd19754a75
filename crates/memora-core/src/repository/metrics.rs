//! Behavioral metrics repository trait definition.

use memora_types::error::RepositoryError;
use memora_types::metrics::BehavioralMetrics;
use memora_types::patient::PatientId;

pub trait MetricsRepository: Send + Sync {
    /// Up to `limit` most recent days, newest first.
    fn recent(
        &self,
        patient_id: &PatientId,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<BehavioralMetrics>, RepositoryError>> + Send;

    /// Insert or replace the row for `(patient_id, date)`.
    fn upsert(
        &self,
        metrics: &BehavioralMetrics,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
