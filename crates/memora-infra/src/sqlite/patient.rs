//! SQLite patient repository.

use memora_core::repository::patient::PatientRepository;
use memora_types::error::RepositoryError;
use memora_types::patient::{Patient, PatientId, UserId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_write_error, parse_datetime, parse_id, query_error, to_u32};

pub struct SqlitePatientRepository {
    pool: DatabasePool,
}

impl SqlitePatientRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct PatientRow {
    id: String,
    user_id: String,
    name: String,
    age: i64,
    diagnosis_stage: Option<String>,
    location: Option<String>,
    preferred_name: Option<String>,
    letta_agent_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PatientRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            diagnosis_stage: row.try_get("diagnosis_stage")?,
            location: row.try_get("location")?,
            preferred_name: row.try_get("preferred_name")?,
            letta_agent_id: row.try_get("letta_agent_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_patient(self) -> Result<Patient, RepositoryError> {
        Ok(Patient {
            id: parse_id(&self.id, "patient")?,
            user_id: UserId::new(self.user_id),
            name: self.name,
            age: to_u32(self.age, "age")?,
            diagnosis_stage: self.diagnosis_stage,
            location: self.location,
            preferred_name: self.preferred_name,
            letta_agent_id: self.letta_agent_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl PatientRepository for SqlitePatientRepository {
    async fn create(&self, patient: &Patient) -> Result<Patient, RepositoryError> {
        sqlx::query(
            "INSERT INTO patients (id, user_id, name, age, diagnosis_stage, location, preferred_name, letta_agent_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(patient.id.to_string())
        .bind(patient.user_id.as_str())
        .bind(&patient.name)
        .bind(i64::from(patient.age))
        .bind(&patient.diagnosis_stage)
        .bind(&patient.location)
        .bind(&patient.preferred_name)
        .bind(&patient.letta_agent_id)
        .bind(format_datetime(&patient.created_at))
        .bind(format_datetime(&patient.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            map_write_error(e, || format!("patient for user '{}' already exists", patient.user_id))
        })?;

        Ok(patient.clone())
    }

    async fn upsert(&self, patient: &Patient) -> Result<Patient, RepositoryError> {
        sqlx::query(
            "INSERT INTO patients (id, user_id, name, age, diagnosis_stage, location, preferred_name, letta_agent_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                name = excluded.name,
                age = excluded.age,
                diagnosis_stage = excluded.diagnosis_stage,
                location = excluded.location,
                preferred_name = excluded.preferred_name,
                letta_agent_id = excluded.letta_agent_id,
                updated_at = excluded.updated_at",
        )
        .bind(patient.id.to_string())
        .bind(patient.user_id.as_str())
        .bind(&patient.name)
        .bind(i64::from(patient.age))
        .bind(&patient.diagnosis_stage)
        .bind(&patient.location)
        .bind(&patient.preferred_name)
        .bind(&patient.letta_agent_id)
        .bind(format_datetime(&patient.created_at))
        .bind(format_datetime(&patient.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            map_write_error(e, || format!("user '{}' already owns another patient", patient.user_id))
        })?;

        Ok(patient.clone())
    }

    async fn get_by_id(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| PatientRow::from_row(&row).map_err(query_error)?.into_patient())
            .transpose()
    }

    async fn set_agent_id(&self, id: &PatientId, agent_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE patients SET letta_agent_id = ?, updated_at = ? WHERE id = ?")
            .bind(agent_id)
            .bind(format_datetime(&chrono::Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
