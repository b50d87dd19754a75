//! Per-patient care records: medications, doses, daily activities, sleep.
//!
//! These are simple time-stamped rows. The only cross-entity rule is that
//! each one references an existing patient (or medication, for doses).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::patient::PatientId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub name: String,
    /// Free-form strength and form ("10mg tablet").
    pub dosage: String,
    /// Times of day the medication is due, as `HH:MM`.
    pub schedule: Vec<String>,
    pub instructions: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a single scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Pending,
    Taken,
    Missed,
    Skipped,
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseStatus::Pending => write!(f, "pending"),
            DoseStatus::Taken => write!(f, "taken"),
            DoseStatus::Missed => write!(f, "missed"),
            DoseStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl FromStr for DoseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DoseStatus::Pending),
            "taken" => Ok(DoseStatus::Taken),
            "missed" => Ok(DoseStatus::Missed),
            "skipped" => Ok(DoseStatus::Skipped),
            other => Err(format!("invalid dose status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDose {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub taken_at: Option<DateTime<Utc>>,
    pub status: DoseStatus,
}

/// Medication together with its doses for the requested day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationWithDoses {
    #[serde(flatten)]
    pub medication: Medication,
    pub doses: Vec<MedicationDose>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Walk,
    Meal,
    Social,
    Exercise,
    Cognitive,
    Other,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Walk => write!(f, "walk"),
            ActivityKind::Meal => write!(f, "meal"),
            ActivityKind::Social => write!(f, "social"),
            ActivityKind::Exercise => write!(f, "exercise"),
            ActivityKind::Cognitive => write!(f, "cognitive"),
            ActivityKind::Other => write!(f, "other"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "walk" => Ok(ActivityKind::Walk),
            "meal" => Ok(ActivityKind::Meal),
            "social" => Ok(ActivityKind::Social),
            "exercise" => Ok(ActivityKind::Exercise),
            "cognitive" => Ok(ActivityKind::Cognitive),
            "other" => Ok(ActivityKind::Other),
            other => Err(format!("invalid activity kind: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub kind: ActivityKind,
    pub description: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLog {
    pub id: Uuid,
    pub patient_id: PatientId,
    /// Calendar date of the evening the night started.
    pub night_of: NaiveDate,
    pub bed_time: DateTime<Utc>,
    pub wake_time: DateTime<Utc>,
    /// Self- or caregiver-reported quality, 1 (poor) to 5 (excellent).
    pub quality: u8,
    pub interruptions: u32,
}

impl SleepLog {
    pub fn duration_minutes(&self) -> i64 {
        (self.wake_time - self.bed_time).num_minutes().max(0)
    }
}
