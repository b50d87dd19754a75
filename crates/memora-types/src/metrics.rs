use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patient::PatientId;

/// Daily aggregate of a patient's conversational and activity patterns.
///
/// One row per patient per day. Scores are produced by an offline job; this
/// service only reads them (and seeds demo values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralMetrics {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub date: NaiveDate,
    pub avg_response_time_ms: f64,
    pub recall_successes: u32,
    pub recall_attempts: u32,
    /// 0.0 (distressed) to 1.0 (content).
    pub mood_score: f64,
    /// 0.0 (withdrawn) to 1.0 (fully engaged).
    pub engagement_score: f64,
    pub conversation_minutes: u32,
    pub created_at: DateTime<Utc>,
}

impl BehavioralMetrics {
    /// Share of successful recall prompts, `None` when nothing was attempted.
    pub fn recall_rate(&self) -> Option<f64> {
        (self.recall_attempts > 0)
            .then(|| f64::from(self.recall_successes) / f64::from(self.recall_attempts))
    }
}
