use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Fixed identifier of the shared demo patient.
///
/// Any authenticated identity may read this patient's records. The seeding
/// routine creates it under this id.
pub const DEMO_PATIENT_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_d3e0);

/// Auth user id the seeded demo patient is attached to.
pub const DEMO_PATIENT_USER_ID: &str = "demo-user";

/// Identity issued by the external auth provider (the `sub` claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a patient, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub Uuid);

impl PatientId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The well-known demo patient.
    pub fn demo() -> Self {
        Self(DEMO_PATIENT_ID)
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A monitored patient.
///
/// Tied 1:1 to an external auth identity. `letta_agent_id` is set once the
/// patient's conversational agent has been provisioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub user_id: UserId,
    pub name: String,
    pub age: u32,
    pub diagnosis_stage: Option<String>,
    /// Free-form location label ("Home", "Sunrise Care Home, room 12").
    pub location: Option<String>,
    /// Name the agent should use when addressing the patient.
    pub preferred_name: Option<String>,
    pub letta_agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Name to use in conversation: the preferred name when set, else the full name.
    pub fn display_name(&self) -> &str {
        self.preferred_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(preferred: Option<&str>) -> Patient {
        let now = Utc::now();
        Patient {
            id: PatientId::new(),
            user_id: UserId::new("user_1"),
            name: "Margaret Holloway".to_string(),
            age: 82,
            diagnosis_stage: Some("early".to_string()),
            location: None,
            preferred_name: preferred.map(str::to_string),
            letta_agent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patient_id_parse() {
        let id = PatientId::new();
        let parsed: PatientId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("patient-1".parse::<PatientId>().is_err());
    }

    #[test]
    fn test_demo_id_is_stable() {
        assert_eq!(PatientId::demo().0, DEMO_PATIENT_ID);
        assert_eq!(PatientId::demo(), PatientId::demo());
    }

    #[test]
    fn test_display_name_prefers_preferred_name() {
        assert_eq!(patient(Some("Maggie")).display_name(), "Maggie");
        assert_eq!(patient(None).display_name(), "Margaret Holloway");
        assert_eq!(patient(Some("  ")).display_name(), "Margaret Holloway");
    }

    #[test]
    fn test_patient_serializes_camel_case() {
        let json = serde_json::to_value(patient(None)).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("lettaAgentId").is_some());
        assert_eq!(json["userId"], "user_1");
    }
}
