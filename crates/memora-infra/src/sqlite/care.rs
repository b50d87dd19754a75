//! SQLite care record repository: medications, doses, activities, sleep.
//!
//! Writes are upserts keyed by id (sleep logs by patient and night), so
//! re-applying the same records leaves the tables unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use memora_core::repository::care::CareRepository;
use memora_types::care::{DailyActivity, DoseStatus, Medication, MedicationDose, SleepLog};
use memora_types::error::RepositoryError;
use memora_types::patient::PatientId;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::pool::DatabasePool;
use super::{format_datetime, parse_date, parse_datetime, parse_id, query_error, to_u32};

pub struct SqliteCareRepository {
    pool: DatabasePool,
}

impl SqliteCareRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(query_error)
}

fn medication_from_row(row: &SqliteRow) -> Result<Medication, RepositoryError> {
    let schedule: String = get(row, "schedule")?;
    let schedule: Vec<String> = serde_json::from_str(&schedule)
        .map_err(|e| RepositoryError::Query(format!("invalid schedule JSON: {e}")))?;

    Ok(Medication {
        id: parse_id(&get::<String>(row, "id")?, "medication")?,
        patient_id: parse_id(&get::<String>(row, "patient_id")?, "patient")?,
        name: get(row, "name")?,
        dosage: get(row, "dosage")?,
        schedule,
        instructions: get(row, "instructions")?,
        active: get(row, "active")?,
        created_at: parse_datetime(&get::<String>(row, "created_at")?)?,
    })
}

fn dose_from_row(row: &SqliteRow) -> Result<MedicationDose, RepositoryError> {
    let status: DoseStatus = get::<String>(row, "status")?
        .parse()
        .map_err(RepositoryError::Query)?;

    Ok(MedicationDose {
        id: parse_id(&get::<String>(row, "id")?, "dose")?,
        medication_id: parse_id(&get::<String>(row, "medication_id")?, "medication")?,
        scheduled_at: parse_datetime(&get::<String>(row, "scheduled_at")?)?,
        taken_at: get::<Option<String>>(row, "taken_at")?
            .as_deref()
            .map(parse_datetime)
            .transpose()?,
        status,
    })
}

fn activity_from_row(row: &SqliteRow) -> Result<DailyActivity, RepositoryError> {
    Ok(DailyActivity {
        id: parse_id(&get::<String>(row, "id")?, "activity")?,
        patient_id: parse_id(&get::<String>(row, "patient_id")?, "patient")?,
        kind: get::<String>(row, "kind")?
            .parse()
            .map_err(RepositoryError::Query)?,
        description: get(row, "description")?,
        started_at: parse_datetime(&get::<String>(row, "started_at")?)?,
        duration_minutes: to_u32(get(row, "duration_minutes")?, "duration_minutes")?,
    })
}

fn sleep_from_row(row: &SqliteRow) -> Result<SleepLog, RepositoryError> {
    let quality: i64 = get(row, "quality")?;
    Ok(SleepLog {
        id: parse_id(&get::<String>(row, "id")?, "sleep log")?,
        patient_id: parse_id(&get::<String>(row, "patient_id")?, "patient")?,
        night_of: parse_date(&get::<String>(row, "night_of")?)?,
        bed_time: parse_datetime(&get::<String>(row, "bed_time")?)?,
        wake_time: parse_datetime(&get::<String>(row, "wake_time")?)?,
        quality: u8::try_from(quality)
            .map_err(|_| RepositoryError::Query(format!("quality out of range: {quality}")))?,
        interruptions: to_u32(get(row, "interruptions")?, "interruptions")?,
    })
}

fn collect<T>(
    rows: &[SqliteRow],
    map: impl Fn(&SqliteRow) -> Result<T, RepositoryError>,
) -> Result<Vec<T>, RepositoryError> {
    rows.iter().map(map).collect()
}

impl CareRepository for SqliteCareRepository {
    async fn list_active_medications(&self, patient_id: &PatientId) -> Result<Vec<Medication>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM medications WHERE patient_id = ? AND active = 1 ORDER BY name ASC",
        )
        .bind(patient_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        collect(&rows, medication_from_row)
    }

    async fn doses_between(
        &self,
        patient_id: &PatientId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MedicationDose>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT d.* FROM medication_doses d
             JOIN medications m ON m.id = d.medication_id
             WHERE m.patient_id = ? AND d.scheduled_at >= ? AND d.scheduled_at < ?
             ORDER BY d.scheduled_at ASC",
        )
        .bind(patient_id.to_string())
        .bind(format_datetime(&from))
        .bind(format_datetime(&to))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        collect(&rows, dose_from_row)
    }

    async fn activities_since(
        &self,
        patient_id: &PatientId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyActivity>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM daily_activities WHERE patient_id = ? AND started_at >= ?
             ORDER BY started_at DESC",
        )
        .bind(patient_id.to_string())
        .bind(format_datetime(&since))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        collect(&rows, activity_from_row)
    }

    async fn sleep_since(&self, patient_id: &PatientId, since: NaiveDate) -> Result<Vec<SleepLog>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM sleep_logs WHERE patient_id = ? AND night_of >= ?
             ORDER BY night_of DESC",
        )
        .bind(patient_id.to_string())
        .bind(since.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        collect(&rows, sleep_from_row)
    }

    async fn upsert_medication(&self, medication: &Medication) -> Result<(), RepositoryError> {
        let schedule = serde_json::to_string(&medication.schedule)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO medications (id, patient_id, name, dosage, schedule, instructions, active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                dosage = excluded.dosage,
                schedule = excluded.schedule,
                instructions = excluded.instructions,
                active = excluded.active",
        )
        .bind(medication.id.to_string())
        .bind(medication.patient_id.to_string())
        .bind(&medication.name)
        .bind(&medication.dosage)
        .bind(schedule)
        .bind(&medication.instructions)
        .bind(medication.active)
        .bind(format_datetime(&medication.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn upsert_dose(&self, dose: &MedicationDose) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO medication_doses (id, medication_id, scheduled_at, taken_at, status)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                scheduled_at = excluded.scheduled_at,
                taken_at = excluded.taken_at,
                status = excluded.status",
        )
        .bind(dose.id.to_string())
        .bind(dose.medication_id.to_string())
        .bind(format_datetime(&dose.scheduled_at))
        .bind(dose.taken_at.as_ref().map(format_datetime))
        .bind(dose.status.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn upsert_activity(&self, activity: &DailyActivity) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO daily_activities (id, patient_id, kind, description, started_at, duration_minutes)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                description = excluded.description,
                started_at = excluded.started_at,
                duration_minutes = excluded.duration_minutes",
        )
        .bind(activity.id.to_string())
        .bind(activity.patient_id.to_string())
        .bind(activity.kind.to_string())
        .bind(&activity.description)
        .bind(format_datetime(&activity.started_at))
        .bind(i64::from(activity.duration_minutes))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn upsert_sleep_log(&self, log: &SleepLog) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sleep_logs (id, patient_id, night_of, bed_time, wake_time, quality, interruptions)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(patient_id, night_of) DO UPDATE SET
                bed_time = excluded.bed_time,
                wake_time = excluded.wake_time,
                quality = excluded.quality,
                interruptions = excluded.interruptions",
        )
        .bind(log.id.to_string())
        .bind(log.patient_id.to_string())
        .bind(log.night_of.to_string())
        .bind(format_datetime(&log.bed_time))
        .bind(format_datetime(&log.wake_time))
        .bind(i64::from(log.quality))
        .bind(i64::from(log.interruptions))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }
}
