//! SQLite behavioral metrics repository.

use memora_core::repository::metrics::MetricsRepository;
use memora_types::error::RepositoryError;
use memora_types::metrics::BehavioralMetrics;
use memora_types::patient::PatientId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_date, parse_datetime, parse_id, query_error, to_u32};

pub struct SqliteMetricsRepository {
    pool: DatabasePool,
}

impl SqliteMetricsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MetricsRow {
    id: String,
    patient_id: String,
    date: String,
    avg_response_time_ms: f64,
    recall_successes: i64,
    recall_attempts: i64,
    mood_score: f64,
    engagement_score: f64,
    conversation_minutes: i64,
    created_at: String,
}

impl MetricsRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            date: row.try_get("date")?,
            avg_response_time_ms: row.try_get("avg_response_time_ms")?,
            recall_successes: row.try_get("recall_successes")?,
            recall_attempts: row.try_get("recall_attempts")?,
            mood_score: row.try_get("mood_score")?,
            engagement_score: row.try_get("engagement_score")?,
            conversation_minutes: row.try_get("conversation_minutes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_metrics(self) -> Result<BehavioralMetrics, RepositoryError> {
        Ok(BehavioralMetrics {
            id: parse_id(&self.id, "metrics")?,
            patient_id: parse_id(&self.patient_id, "patient")?,
            date: parse_date(&self.date)?,
            avg_response_time_ms: self.avg_response_time_ms,
            recall_successes: to_u32(self.recall_successes, "recall_successes")?,
            recall_attempts: to_u32(self.recall_attempts, "recall_attempts")?,
            mood_score: self.mood_score,
            engagement_score: self.engagement_score,
            conversation_minutes: to_u32(self.conversation_minutes, "conversation_minutes")?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl MetricsRepository for SqliteMetricsRepository {
    async fn recent(&self, patient_id: &PatientId, limit: u32) -> Result<Vec<BehavioralMetrics>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM behavioral_metrics WHERE patient_id = ? ORDER BY date DESC LIMIT ?",
        )
        .bind(patient_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut metrics = Vec::with_capacity(rows.len());
        for row in &rows {
            metrics.push(MetricsRow::from_row(row).map_err(query_error)?.into_metrics()?);
        }
        Ok(metrics)
    }

    async fn upsert(&self, metrics: &BehavioralMetrics) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO behavioral_metrics (id, patient_id, date, avg_response_time_ms, recall_successes, recall_attempts, mood_score, engagement_score, conversation_minutes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(patient_id, date) DO UPDATE SET
                avg_response_time_ms = excluded.avg_response_time_ms,
                recall_successes = excluded.recall_successes,
                recall_attempts = excluded.recall_attempts,
                mood_score = excluded.mood_score,
                engagement_score = excluded.engagement_score,
                conversation_minutes = excluded.conversation_minutes",
        )
        .bind(metrics.id.to_string())
        .bind(metrics.patient_id.to_string())
        .bind(metrics.date.to_string())
        .bind(metrics.avg_response_time_ms)
        .bind(i64::from(metrics.recall_successes))
        .bind(i64::from(metrics.recall_attempts))
        .bind(metrics.mood_score)
        .bind(metrics.engagement_score)
        .bind(i64::from(metrics.conversation_minutes))
        .bind(format_datetime(&metrics.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }
}
