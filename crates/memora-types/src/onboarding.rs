//! Onboarding payload parsing and validation.
//!
//! The request body is a JSON object discriminated by `role`. Validation stops
//! at the first failing field and reports its path, checking `role`, then
//! `name`, then the role-specific fields in declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_AGE: u64 = 150;
const MAX_OPTIONAL_LEN: usize = 200;

/// Which kind of account is being onboarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Caregiver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Caregiver => write!(f, "caregiver"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub diagnosis_stage: Option<String>,
    pub location: Option<String>,
    pub preferred_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCaregiver {
    pub name: String,
    pub email: Option<String>,
}

/// A validated onboarding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingRequest {
    Patient(NewPatient),
    Caregiver(NewCaregiver),
}

impl OnboardingRequest {
    pub fn role(&self) -> Role {
        match self {
            OnboardingRequest::Patient(_) => Role::Patient,
            OnboardingRequest::Caregiver(_) => Role::Caregiver,
        }
    }

    /// Parse and validate a raw JSON body.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ValidationError::new("body", "expected a JSON object"))?;

        let role = match obj.get("role").and_then(Value::as_str) {
            Some("patient") => Role::Patient,
            Some("caregiver") => Role::Caregiver,
            Some(other) => {
                return Err(ValidationError::new(
                    "role",
                    format!("invalid role '{other}', expected 'patient' or 'caregiver'"),
                ));
            }
            None => {
                return Err(ValidationError::new(
                    "role",
                    "role is required and must be 'patient' or 'caregiver'",
                ));
            }
        };

        let name = required_name(obj)?;

        match role {
            Role::Patient => {
                let age = required_age(obj)?;
                Ok(OnboardingRequest::Patient(NewPatient {
                    name,
                    age,
                    diagnosis_stage: optional_string(obj, "diagnosisStage")?,
                    location: optional_string(obj, "location")?,
                    preferred_name: optional_string(obj, "preferredName")?,
                }))
            }
            Role::Caregiver => {
                let email = optional_string(obj, "email")?;
                if let Some(ref email) = email {
                    if !looks_like_email(email) {
                        return Err(ValidationError::new("email", "invalid email address"));
                    }
                }
                Ok(OnboardingRequest::Caregiver(NewCaregiver { name, email }))
            }
        }
    }
}

fn required_name(obj: &Map<String, Value>) -> Result<String, ValidationError> {
    let name = match obj.get("name") {
        None | Some(Value::Null) => {
            return Err(ValidationError::new("name", "name is required"));
        }
        Some(Value::String(s)) => s.trim(),
        Some(_) => return Err(ValidationError::new("name", "name must be a string")),
    };

    if name.is_empty() {
        return Err(ValidationError::new("name", "name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            format!("name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}

fn required_age(obj: &Map<String, Value>) -> Result<u32, ValidationError> {
    let value = match obj.get("age") {
        None | Some(Value::Null) => return Err(ValidationError::new("age", "age is required")),
        Some(v) => v,
    };

    let Some(number) = value.as_number() else {
        return Err(ValidationError::new("age", "age must be a number"));
    };

    // Accept 80 and 80.0, reject 80.5 and anything not strictly positive.
    let age = match (number.as_u64(), number.as_i64(), number.as_f64()) {
        (Some(n), _, _) => n,
        (None, Some(_), _) => {
            return Err(ValidationError::new("age", "age must be a positive integer"));
        }
        (None, None, Some(f)) if f.fract() == 0.0 && f > 0.0 && f <= MAX_AGE as f64 => f as u64,
        _ => return Err(ValidationError::new("age", "age must be a positive integer")),
    };

    if age == 0 {
        return Err(ValidationError::new("age", "age must be a positive integer"));
    }
    if age > MAX_AGE {
        return Err(ValidationError::new(
            "age",
            format!("age must be at most {MAX_AGE}"),
        ));
    }
    Ok(age as u32)
}

/// Optional string field: absent or null is `None`, blank is `None`, any
/// other JSON type fails.
fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.chars().count() > MAX_OPTIONAL_LEN {
                return Err(ValidationError::new(
                    field,
                    format!("{field} must be at most {MAX_OPTIONAL_LEN} characters"),
                ));
            }
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(_) => Err(ValidationError::new(field, format!("{field} must be a string"))),
    }
}

fn looks_like_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Body returned by a successful onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingOutcome {
    pub success: bool,
    /// Id of the created patient or caregiver record.
    pub user_id: String,
    pub role: Role,
    /// Present for patients only; `None` serializes as `null`.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub letta_agent_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Serializes `Some(None)` as `null` while `None` is skipped by the field attribute.
mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Option<String>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
        Ok(Some(Option::<String>::deserialize(d)?))
    }
}
