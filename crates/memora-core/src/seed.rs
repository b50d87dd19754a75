//! Demo data generation.
//!
//! Populates the demo patient with a week (or `days`) of plausible care
//! records. Everything is derived from the patient id and the calendar date,
//! and written with insert-or-replace, so running the seeder twice on the
//! same day leaves the database unchanged.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use memora_types::care::{ActivityKind, DailyActivity, DoseStatus, Medication, MedicationDose, SleepLog};
use memora_types::caregiver::{Caregiver, CaregiverId};
use memora_types::error::RepositoryError;
use memora_types::metrics::BehavioralMetrics;
use memora_types::patient::{Patient, PatientId, UserId, DEMO_PATIENT_USER_ID};

use crate::repository::care::CareRepository;
use crate::repository::caregiver::CaregiverRepository;
use crate::repository::metrics::MetricsRepository;
use crate::repository::patient::PatientRepository;

const DEMO_MEDICATIONS: [(&str, &str, &[&str], Option<&str>); 3] = [
    ("Donepezil", "10mg tablet", &["08:00"], Some("Take with breakfast")),
    ("Memantine", "10mg tablet", &["08:00", "20:00"], None),
    ("Vitamin D3", "1000 IU capsule", &["12:00"], Some("Take with food")),
];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub patient_id: PatientId,
    /// Number of days of history to generate, including today.
    pub days: u32,
    pub today: NaiveDate,
    /// Caregiver identity to create (if missing) and link to the demo patient.
    pub link_caregiver: Option<UserId>,
}

impl SeedOptions {
    pub fn new(patient_id: PatientId, days: u32) -> Self {
        Self {
            patient_id,
            days: days.max(1),
            today: Utc::now().date_naive(),
            link_caregiver: None,
        }
    }
}

/// Counts of what was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub medications: usize,
    pub doses: usize,
    pub activities: usize,
    pub sleep_logs: usize,
    pub metrics: usize,
    pub caregiver_linked: bool,
}

pub struct DemoSeeder<P, C, M, K>
where
    P: PatientRepository,
    C: CaregiverRepository,
    M: MetricsRepository,
    K: CareRepository,
{
    patients: P,
    caregivers: C,
    metrics: M,
    care: K,
}

/// Stable record id for `key` under the patient's namespace.
fn record_id(patient_id: &PatientId, key: &str) -> Uuid {
    Uuid::new_v5(&patient_id.0, key.as_bytes())
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default())
        .and_utc()
}

fn parse_hhmm(s: &str) -> (u32, u32) {
    let (h, m) = s.split_once(':').unwrap_or((s, "0"));
    (h.parse().unwrap_or(0), m.parse().unwrap_or(0))
}

impl<P, C, M, K> DemoSeeder<P, C, M, K>
where
    P: PatientRepository,
    C: CaregiverRepository,
    M: MetricsRepository,
    K: CareRepository,
{
    pub fn new(patients: P, caregivers: C, metrics: M, care: K) -> Self {
        Self {
            patients,
            caregivers,
            metrics,
            care,
        }
    }

    pub async fn seed(&self, options: &SeedOptions) -> Result<SeedReport, RepositoryError> {
        let patient = self.upsert_demo_patient(&options.patient_id).await?;
        let mut report = SeedReport::default();

        let days: Vec<NaiveDate> = (0..options.days.max(1))
            .map(|offset| options.today - Duration::days(i64::from(offset)))
            .collect();

        self.seed_medications(&patient, &days, options.today, &mut report)
            .await?;

        for (index, day) in days.iter().enumerate() {
            for activity in demo_activities(&patient.id, *day, index) {
                self.care.upsert_activity(&activity).await?;
                report.activities += 1;
            }

            // The night before `day`.
            let night_of = *day - Duration::days(1);
            self.care
                .upsert_sleep_log(&demo_sleep(&patient.id, night_of, index))
                .await?;
            report.sleep_logs += 1;

            self.metrics
                .upsert(&demo_metrics(&patient.id, *day, index))
                .await?;
            report.metrics += 1;
        }

        if let Some(user_id) = &options.link_caregiver {
            self.link_caregiver(user_id, &patient.id).await?;
            report.caregiver_linked = true;
        }

        tracing::info!(
            patient_id = %patient.id,
            medications = report.medications,
            doses = report.doses,
            activities = report.activities,
            sleep_logs = report.sleep_logs,
            metrics = report.metrics,
            "demo data seeded"
        );

        Ok(report)
    }

    async fn upsert_demo_patient(&self, id: &PatientId) -> Result<Patient, RepositoryError> {
        let existing = self.patients.get_by_id(id).await?;
        let now = Utc::now();
        let patient = Patient {
            id: *id,
            user_id: UserId::new(DEMO_PATIENT_USER_ID),
            name: "Eleanor Whitfield".to_string(),
            age: 81,
            diagnosis_stage: Some("mild".to_string()),
            location: Some("Home, Portland".to_string()),
            preferred_name: Some("Ellie".to_string()),
            letta_agent_id: existing.as_ref().and_then(|p| p.letta_agent_id.clone()),
            created_at: existing.as_ref().map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        };
        self.patients.upsert(&patient).await
    }

    async fn seed_medications(
        &self,
        patient: &Patient,
        days: &[NaiveDate],
        today: NaiveDate,
        report: &mut SeedReport,
    ) -> Result<(), RepositoryError> {
        for (med_index, (name, dosage, schedule, instructions)) in DEMO_MEDICATIONS.iter().enumerate() {
            let medication = Medication {
                id: record_id(&patient.id, &format!("medication:{med_index}")),
                patient_id: patient.id,
                name: name.to_string(),
                dosage: dosage.to_string(),
                schedule: schedule.iter().map(|s| s.to_string()).collect(),
                instructions: instructions.map(str::to_string),
                active: true,
                created_at: patient.created_at,
            };
            self.care.upsert_medication(&medication).await?;
            report.medications += 1;

            for (day_index, day) in days.iter().enumerate() {
                for (slot, time) in schedule.iter().enumerate() {
                    let (hour, minute) = parse_hhmm(time);
                    let scheduled_at = at(*day, hour, minute);
                    let status = if *day == today {
                        if hour < 12 { DoseStatus::Taken } else { DoseStatus::Pending }
                    } else if (day_index + slot + med_index) % 5 == 4 {
                        DoseStatus::Missed
                    } else {
                        DoseStatus::Taken
                    };
                    let dose = MedicationDose {
                        id: record_id(&patient.id, &format!("dose:{med_index}:{day}:{time}")),
                        medication_id: medication.id,
                        scheduled_at,
                        taken_at: (status == DoseStatus::Taken)
                            .then(|| scheduled_at + Duration::minutes(10)),
                        status,
                    };
                    self.care.upsert_dose(&dose).await?;
                    report.doses += 1;
                }
            }
        }
        Ok(())
    }

    async fn link_caregiver(&self, user_id: &UserId, patient_id: &PatientId) -> Result<(), RepositoryError> {
        let caregiver = match self.caregivers.get_by_user_id(user_id).await? {
            Some(c) => c,
            None => {
                let now = Utc::now();
                self.caregivers
                    .create(&Caregiver {
                        id: CaregiverId::new(),
                        user_id: user_id.clone(),
                        name: "Demo Caregiver".to_string(),
                        email: None,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?
            }
        };
        self.caregivers
            .link(&caregiver.id, patient_id, Some("family"))
            .await
    }
}

fn demo_activities(patient_id: &PatientId, day: NaiveDate, index: usize) -> Vec<DailyActivity> {
    let afternoon = if index % 2 == 0 {
        (ActivityKind::Social, "Video call with daughter")
    } else {
        (ActivityKind::Cognitive, "Crossword puzzle")
    };
    [
        (0, ActivityKind::Walk, "Morning walk around the block", 10, 0, 30 + (index % 3) as u32 * 5),
        (1, ActivityKind::Meal, "Lunch", 12, 30, 45),
        (2, afternoon.0, afternoon.1, 15, 0, 40),
    ]
    .into_iter()
    .map(|(slot, kind, description, hour, minute, duration)| DailyActivity {
        id: record_id(patient_id, &format!("activity:{day}:{slot}")),
        patient_id: *patient_id,
        kind,
        description: description.to_string(),
        started_at: at(day, hour, minute),
        duration_minutes: duration,
    })
    .collect()
}

fn demo_sleep(patient_id: &PatientId, night_of: NaiveDate, index: usize) -> SleepLog {
    let bed_time = at(night_of, 22, 0) + Duration::minutes((index % 3) as i64 * 15);
    let wake_time = at(night_of + Duration::days(1), 6, 30) + Duration::minutes((index % 2) as i64 * 30);
    SleepLog {
        id: record_id(patient_id, &format!("sleep:{night_of}")),
        patient_id: *patient_id,
        night_of,
        bed_time,
        wake_time,
        quality: (3 + (index % 3) as u8).min(5),
        interruptions: (index % 3) as u32,
    }
}

fn demo_metrics(patient_id: &PatientId, date: NaiveDate, index: usize) -> BehavioralMetrics {
    BehavioralMetrics {
        id: record_id(patient_id, &format!("metrics:{date}")),
        patient_id: *patient_id,
        date,
        avg_response_time_ms: 1800.0 + (index % 4) as f64 * 150.0,
        recall_successes: 3 + (index % 4) as u32,
        recall_attempts: 6,
        mood_score: 0.55 + (index % 5) as f64 * 0.07,
        engagement_score: 0.5 + (index % 4) as f64 * 0.1,
        conversation_minutes: 15 + (index % 3) as u32 * 5,
        created_at: at(date, 23, 0),
    }
}
