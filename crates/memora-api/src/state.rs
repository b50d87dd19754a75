//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository and provider traits; AppState pins
//! them to the concrete infra implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use memora_core::seed::DemoSeeder;
use memora_core::service::onboarding::OnboardingService;
use memora_core::service::patient::PatientService;
use memora_infra::config::{configured_services, load_config, ServiceSecrets};
use memora_infra::deepgram::DeepgramClient;
use memora_infra::letta::LettaClient;
use memora_infra::livekit::LiveKitTokenIssuer;
use memora_infra::session::HmacSessionVerifier;
use memora_infra::sqlite::care::SqliteCareRepository;
use memora_infra::sqlite::caregiver::SqliteCaregiverRepository;
use memora_infra::sqlite::metrics::SqliteMetricsRepository;
use memora_infra::sqlite::patient::SqlitePatientRepository;
use memora_infra::sqlite::pool::DatabasePool;
use memora_types::config::MemoraConfig;
use memora_types::patient::PatientId;

pub type ConcreteOnboardingService =
    OnboardingService<SqlitePatientRepository, SqliteCaregiverRepository, LettaClient>;

pub type ConcretePatientService = PatientService<
    SqlitePatientRepository,
    SqliteCaregiverRepository,
    SqliteMetricsRepository,
    SqliteCareRepository,
>;

pub type ConcreteSeeder = DemoSeeder<
    SqlitePatientRepository,
    SqliteCaregiverRepository,
    SqliteMetricsRepository,
    SqliteCareRepository,
>;

/// Shared application state, used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MemoraConfig>,
    pub onboarding_service: Arc<ConcreteOnboardingService>,
    pub patient_service: Arc<ConcretePatientService>,
    pub speech: Arc<DeepgramClient>,
    pub rooms: Arc<LiveKitTokenIssuer>,
    pub sessions: Arc<HmacSessionVerifier>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Open the database in `data_dir`, load config and secrets, wire services.
    pub async fn init(data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let config = load_config(data_dir).await;
        let secrets = ServiceSecrets::from_env();
        let db_pool = DatabasePool::open_in(data_dir).await?;

        tracing::info!(
            data_dir = %data_dir.display(),
            demo_mode = config.demo_mode,
            services = ?configured_services(&config, &secrets),
            "application state ready"
        );

        Self::from_parts(db_pool, config, secrets)
    }

    pub fn from_parts(
        db_pool: DatabasePool,
        config: MemoraConfig,
        secrets: ServiceSecrets,
    ) -> anyhow::Result<Self> {
        let demo_patient_id = PatientId::from_uuid(config.demo_patient_id());

        let onboarding_service = OnboardingService::new(
            SqlitePatientRepository::new(db_pool.clone()),
            SqliteCaregiverRepository::new(db_pool.clone()),
            LettaClient::new(&config.letta, secrets.letta_api_key)
                .context("failed to build Letta HTTP client")?,
        );

        let patient_service = PatientService::new(
            SqlitePatientRepository::new(db_pool.clone()),
            SqliteCaregiverRepository::new(db_pool.clone()),
            SqliteMetricsRepository::new(db_pool.clone()),
            SqliteCareRepository::new(db_pool.clone()),
            demo_patient_id,
        );

        let speech = DeepgramClient::new(&config.deepgram, secrets.deepgram_api_key)
            .context("failed to build Deepgram HTTP client")?;
        let rooms = LiveKitTokenIssuer::new(
            &config.livekit,
            secrets.livekit_api_key,
            secrets.livekit_api_secret,
        );
        let sessions = HmacSessionVerifier::new(secrets.session_secret);

        Ok(Self {
            config: Arc::new(config),
            onboarding_service: Arc::new(onboarding_service),
            patient_service: Arc::new(patient_service),
            speech: Arc::new(speech),
            rooms: Arc::new(rooms),
            sessions: Arc::new(sessions),
            db_pool,
        })
    }

    /// Demo data seeder over the same database.
    pub fn seeder(&self) -> ConcreteSeeder {
        DemoSeeder::new(
            SqlitePatientRepository::new(self.db_pool.clone()),
            SqliteCaregiverRepository::new(self.db_pool.clone()),
            SqliteMetricsRepository::new(self.db_pool.clone()),
            SqliteCareRepository::new(self.db_pool.clone()),
        )
    }

    pub fn demo_patient_id(&self) -> PatientId {
        *self.patient_service.demo_patient_id()
    }
}
