//! In-memory repository mocks shared by the service tests.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use memora_types::care::{DailyActivity, Medication, MedicationDose, SleepLog};
use memora_types::caregiver::{Caregiver, CaregiverId, LinkedCaregiver};
use memora_types::error::{AgentError, RepositoryError};
use memora_types::metrics::BehavioralMetrics;
use memora_types::patient::{Patient, PatientId, UserId};

use crate::agent::AgentProvisioner;
use crate::repository::care::CareRepository;
use crate::repository::caregiver::CaregiverRepository;
use crate::repository::metrics::MetricsRepository;
use crate::repository::patient::PatientRepository;

pub fn make_patient(user_id: &str) -> Patient {
    let now = Utc::now();
    Patient {
        id: PatientId::new(),
        user_id: UserId::new(user_id),
        name: "Edith Clarke".to_string(),
        age: 84,
        diagnosis_stage: Some("early".to_string()),
        location: Some("Home".to_string()),
        preferred_name: None,
        letta_agent_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryPatients {
    pub(crate) rows: Mutex<Vec<Patient>>,
    pub fail_writes: bool,
}

impl InMemoryPatients {
    pub fn with(rows: Vec<Patient>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail_writes: false,
        }
    }

    pub fn all(&self) -> Vec<Patient> {
        self.rows.lock().unwrap().clone()
    }
}

impl PatientRepository for InMemoryPatients {
    async fn create(&self, patient: &Patient) -> Result<Patient, RepositoryError> {
        if self.fail_writes {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.user_id == patient.user_id) {
            return Err(RepositoryError::Conflict(patient.user_id.to_string()));
        }
        rows.push(patient.clone());
        Ok(patient.clone())
    }

    async fn upsert(&self, patient: &Patient) -> Result<Patient, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|p| p.id != patient.id);
        rows.push(patient.clone());
        Ok(patient.clone())
    }

    async fn get_by_id(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| &p.id == id).cloned())
    }

    async fn set_agent_id(&self, id: &PatientId, agent_id: &str) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let patient = rows
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        patient.letta_agent_id = Some(agent_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCaregivers {
    rows: Mutex<Vec<Caregiver>>,
    links: Mutex<Vec<(String, PatientId, Option<String>)>>,
}

impl InMemoryCaregivers {
    /// Register a link by caregiver user id, creating the caregiver if needed.
    pub fn add_link(&self, user_id: &str, patient_id: PatientId) {
        let mut rows = self.rows.lock().unwrap();
        if !rows.iter().any(|c| c.user_id.as_str() == user_id) {
            let now = Utc::now();
            rows.push(Caregiver {
                id: CaregiverId::new(),
                user_id: UserId::new(user_id),
                name: format!("Caregiver {user_id}"),
                email: None,
                created_at: now,
                updated_at: now,
            });
        }
        self.links
            .lock()
            .unwrap()
            .push((user_id.to_string(), patient_id, Some("family".to_string())));
    }

    pub fn all(&self) -> Vec<Caregiver> {
        self.rows.lock().unwrap().clone()
    }
}

impl CaregiverRepository for InMemoryCaregivers {
    async fn create(&self, caregiver: &Caregiver) -> Result<Caregiver, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.user_id == caregiver.user_id) {
            return Err(RepositoryError::Conflict(caregiver.user_id.to_string()));
        }
        rows.push(caregiver.clone());
        Ok(caregiver.clone())
    }

    async fn get_by_user_id(&self, user_id: &UserId) -> Result<Option<Caregiver>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.user_id == user_id)
            .cloned())
    }

    async fn link(
        &self,
        caregiver_id: &CaregiverId,
        patient_id: &PatientId,
        relationship: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let user_id = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == caregiver_id)
            .map(|c| c.user_id.to_string())
            .ok_or(RepositoryError::NotFound)?;
        let mut links = self.links.lock().unwrap();
        if !links.iter().any(|(u, p, _)| u == &user_id && p == patient_id) {
            links.push((user_id, *patient_id, relationship.map(str::to_string)));
        }
        Ok(())
    }

    async fn is_linked(&self, user_id: &UserId, patient_id: &PatientId) -> Result<bool, RepositoryError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .any(|(u, p, _)| u == user_id.as_str() && p == patient_id))
    }

    async fn list_for_patient(&self, patient_id: &PatientId) -> Result<Vec<LinkedCaregiver>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p, _)| p == patient_id)
            .filter_map(|(u, _, rel)| {
                rows.iter().find(|c| c.user_id.as_str() == u).map(|c| LinkedCaregiver {
                    id: c.id,
                    name: c.name.clone(),
                    email: c.email.clone(),
                    relationship: rel.clone(),
                })
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryMetrics {
    rows: Mutex<Vec<BehavioralMetrics>>,
}

impl InMemoryMetrics {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl MetricsRepository for InMemoryMetrics {
    async fn recent(&self, patient_id: &PatientId, limit: u32) -> Result<Vec<BehavioralMetrics>, RepositoryError> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.patient_id == patient_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn upsert(&self, metrics: &BehavioralMetrics) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|m| !(m.patient_id == metrics.patient_id && m.date == metrics.date));
        rows.push(metrics.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCare {
    pub medications: Mutex<Vec<Medication>>,
    pub doses: Mutex<Vec<MedicationDose>>,
    pub activities: Mutex<Vec<DailyActivity>>,
    pub sleep: Mutex<Vec<SleepLog>>,
}

fn upsert_by<T: Clone>(rows: &Mutex<Vec<T>>, item: &T, same: impl Fn(&T) -> bool) {
    let mut rows = rows.lock().unwrap();
    rows.retain(|r| !same(r));
    rows.push(item.clone());
}

impl CareRepository for InMemoryCare {
    async fn list_active_medications(&self, patient_id: &PatientId) -> Result<Vec<Medication>, RepositoryError> {
        Ok(self
            .medications
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.patient_id == patient_id && m.active)
            .cloned()
            .collect())
    }

    async fn doses_between(
        &self,
        patient_id: &PatientId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MedicationDose>, RepositoryError> {
        let meds: Vec<_> = self
            .medications
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.patient_id == patient_id)
            .map(|m| m.id)
            .collect();
        let mut doses: Vec<_> = self
            .doses
            .lock()
            .unwrap()
            .iter()
            .filter(|d| meds.contains(&d.medication_id) && d.scheduled_at >= from && d.scheduled_at < to)
            .cloned()
            .collect();
        doses.sort_by_key(|d| d.scheduled_at);
        Ok(doses)
    }

    async fn activities_since(
        &self,
        patient_id: &PatientId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyActivity>, RepositoryError> {
        let mut rows: Vec<_> = self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|a| &a.patient_id == patient_id && a.started_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(rows)
    }

    async fn sleep_since(&self, patient_id: &PatientId, since: NaiveDate) -> Result<Vec<SleepLog>, RepositoryError> {
        let mut rows: Vec<_> = self
            .sleep
            .lock()
            .unwrap()
            .iter()
            .filter(|s| &s.patient_id == patient_id && s.night_of >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.night_of.cmp(&a.night_of));
        Ok(rows)
    }

    async fn upsert_medication(&self, medication: &Medication) -> Result<(), RepositoryError> {
        upsert_by(&self.medications, medication, |m| m.id == medication.id);
        Ok(())
    }

    async fn upsert_dose(&self, dose: &MedicationDose) -> Result<(), RepositoryError> {
        upsert_by(&self.doses, dose, |d| d.id == dose.id);
        Ok(())
    }

    async fn upsert_activity(&self, activity: &DailyActivity) -> Result<(), RepositoryError> {
        upsert_by(&self.activities, activity, |a| a.id == activity.id);
        Ok(())
    }

    async fn upsert_sleep_log(&self, log: &SleepLog) -> Result<(), RepositoryError> {
        upsert_by(&self.sleep, log, |s| {
            s.patient_id == log.patient_id && s.night_of == log.night_of
        });
        Ok(())
    }
}

/// Agent provisioner that either succeeds with a fixed id or always fails.
pub struct MockProvisioner {
    pub agent_id: Option<&'static str>,
}

impl AgentProvisioner for MockProvisioner {
    async fn provision(&self, _patient: &Patient) -> Result<String, AgentError> {
        match self.agent_id {
            Some(id) => Ok(id.to_string()),
            None => Err(AgentError::Api {
                status: 503,
                body: "agent service unavailable".to_string(),
            }),
        }
    }
}
