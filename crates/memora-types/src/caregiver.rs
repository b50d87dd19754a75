use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::patient::{PatientId, UserId};

/// Unique identifier for a caregiver, wrapping a UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaregiverId(pub Uuid);

impl CaregiverId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CaregiverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaregiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaregiverId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A family member or professional who monitors one or more patients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: CaregiverId,
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row between a caregiver and a patient.
///
/// At most one link exists per (caregiver, patient) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverLink {
    pub caregiver_id: CaregiverId,
    pub patient_id: PatientId,
    /// e.g. "daughter", "nurse".
    pub relationship: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caregiver summary embedded in a patient detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedCaregiver {
    pub id: CaregiverId,
    pub name: String,
    pub email: Option<String>,
    pub relationship: Option<String>,
}
