//! SQLite caregiver repository, including caregiver-patient links.

use chrono::Utc;
use memora_core::repository::caregiver::CaregiverRepository;
use memora_types::caregiver::{Caregiver, CaregiverId, LinkedCaregiver};
use memora_types::error::RepositoryError;
use memora_types::patient::{PatientId, UserId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_write_error, parse_datetime, parse_id, query_error};

pub struct SqliteCaregiverRepository {
    pool: DatabasePool,
}

impl SqliteCaregiverRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn caregiver_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Caregiver, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_error)?;
    let user_id: String = row.try_get("user_id").map_err(query_error)?;
    let created_at: String = row.try_get("created_at").map_err(query_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(query_error)?;

    Ok(Caregiver {
        id: parse_id(&id, "caregiver")?,
        user_id: UserId::new(user_id),
        name: row.try_get("name").map_err(query_error)?,
        email: row.try_get("email").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

impl CaregiverRepository for SqliteCaregiverRepository {
    async fn create(&self, caregiver: &Caregiver) -> Result<Caregiver, RepositoryError> {
        sqlx::query(
            "INSERT INTO caregivers (id, user_id, name, email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(caregiver.id.to_string())
        .bind(caregiver.user_id.as_str())
        .bind(&caregiver.name)
        .bind(&caregiver.email)
        .bind(format_datetime(&caregiver.created_at))
        .bind(format_datetime(&caregiver.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            map_write_error(e, || format!("caregiver for user '{}' already exists", caregiver.user_id))
        })?;

        Ok(caregiver.clone())
    }

    async fn get_by_user_id(&self, user_id: &UserId) -> Result<Option<Caregiver>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM caregivers WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(caregiver_from_row).transpose()
    }

    async fn link(
        &self,
        caregiver_id: &CaregiverId,
        patient_id: &PatientId,
        relationship: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR IGNORE INTO caregiver_patients (caregiver_id, patient_id, relationship, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(caregiver_id.to_string())
        .bind(patient_id.to_string())
        .bind(relationship)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn is_linked(&self, user_id: &UserId, patient_id: &PatientId) -> Result<bool, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM caregiver_patients cp
             JOIN caregivers c ON c.id = cp.caregiver_id
             WHERE c.user_id = ? AND cp.patient_id = ?",
        )
        .bind(user_id.as_str())
        .bind(patient_id.to_string())
        .fetch_one(&self.pool.reader)
        .await
        .map_err(query_error)?;
        Ok(count > 0)
    }

    async fn list_for_patient(&self, patient_id: &PatientId) -> Result<Vec<LinkedCaregiver>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT c.id, c.name, c.email, cp.relationship
             FROM caregiver_patients cp
             JOIN caregivers c ON c.id = cp.caregiver_id
             WHERE cp.patient_id = ?
             ORDER BY cp.created_at ASC",
        )
        .bind(patient_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(query_error)?;
                Ok::<_, RepositoryError>(LinkedCaregiver {
                    id: parse_id(&id, "caregiver")?,
                    name: row.try_get("name").map_err(query_error)?,
                    email: row.try_get("email").map_err(query_error)?,
                    relationship: row.try_get("relationship").map_err(query_error)?,
                })
            })
            .collect()
    }
}
