//! Axum router configuration with middleware.
//!
//! Routes live under `/api/`; `/health` is unauthenticated.
//! Middleware: CORS (open), request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Onboarding
        .route("/onboard", post(handlers::onboard::onboard))
        // Patient dashboard
        .route("/patients/{id}", get(handlers::patient::get_patient))
        .route(
            "/patients/{id}/behavioral-metrics",
            get(handlers::patient::get_behavioral_metrics),
        )
        .route(
            "/patients/{id}/medications",
            get(handlers::patient::get_medications),
        )
        .route(
            "/patients/{id}/activities",
            get(handlers::patient::get_activities),
        )
        .route("/patients/{id}/sleep", get(handlers::patient::get_sleep))
        // Speech
        .route("/audio/token", get(handlers::audio::get_token))
        .route("/audio/speak", post(handlers::audio::speak))
        // Realtime rooms
        .route("/livekit/token", get(handlers::livekit::get_token));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use memora_core::seed::SeedOptions;
    use memora_infra::config::ServiceSecrets;
    use memora_infra::session::issue_session_token;
    use memora_infra::sqlite::pool::DatabasePool;
    use memora_types::config::MemoraConfig;
    use memora_types::patient::{PatientId, DEMO_PATIENT_ID};

    const SESSION_SECRET: &str = "router-test-session-secret";
    const LIVEKIT_SECRET: &str = "router-test-livekit-secret";

    struct TestApp {
        state: AppState,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        async fn new() -> Self {
            Self::with(MemoraConfig::default(), secrets()).await
        }

        async fn with(config: MemoraConfig, secrets: ServiceSecrets) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let pool = DatabasePool::open_in(dir.path()).await.unwrap();
            Self {
                state: AppState::from_parts(pool, config, secrets).unwrap(),
                _dir: dir,
            }
        }

        async fn seed_demo(&self) {
            let options = SeedOptions::new(PatientId::from_uuid(DEMO_PATIENT_ID), 7);
            self.state.seeder().seed(&options).await.unwrap();
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = build_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }
    }

    fn secrets() -> ServiceSecrets {
        ServiceSecrets {
            session_secret: Some(SecretString::from(SESSION_SECRET)),
            ..ServiceSecrets::default()
        }
    }

    fn token_for(user_id: &str) -> String {
        issue_session_token(&SecretString::from(SESSION_SECRET), user_id, 3600).unwrap()
    }

    fn get(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user) = user {
            builder = builder.header("Authorization", format!("Bearer {}", token_for(user)));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, user: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(user) = user {
            builder = builder.header("Authorization", format!("Bearer {}", token_for(user)));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn onboard_patient(app: &TestApp, user: &str) -> String {
        let body = json!({"role": "patient", "name": "Walter Price", "age": 77}).to_string();
        let (status, body) = app.send(post_json("/api/onboard", Some(user), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["userId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let (status, body) = app.send(get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn onboard_requires_auth_before_validation() {
        let app = TestApp::new().await;
        let (status, body) = app.send(post_json("/api/onboard", None, "{}")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn onboard_names_missing_field() {
        let app = TestApp::new().await;
        let body = json!({"role": "patient", "name": "Ada"}).to_string();
        let (status, body) = app.send(post_json("/api/onboard", Some("user_a"), &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "age");
    }

    #[tokio::test]
    async fn onboard_rejects_malformed_json() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(post_json("/api/onboard", Some("user_a"), "{\"role\": "))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn onboard_patient_without_agent_service_warns() {
        let app = TestApp::new().await;
        let body = json!({"role": "patient", "name": "Walter Price", "age": 77}).to_string();
        let (status, body) = app.send(post_json("/api/onboard", Some("user_w"), &body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["role"], "patient");
        assert!(body["lettaAgentId"].is_null());
        assert!(!body["warning"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn onboard_twice_conflicts() {
        let app = TestApp::new().await;
        let body = json!({"role": "caregiver", "name": "Rosa", "email": "rosa@example.com"}).to_string();

        let (first, created) = app.send(post_json("/api/onboard", Some("user_r"), &body)).await;
        assert_eq!(first, StatusCode::CREATED);
        assert!(created.get("lettaAgentId").is_none());

        let (second, body) = app.send(post_json("/api/onboard", Some("user_r"), &body)).await;
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn bad_or_expired_session_is_rejected() {
        let app = TestApp::new().await;
        let uri = format!("/api/patients/{DEMO_PATIENT_ID}");

        let forged = issue_session_token(&SecretString::from("other-secret"), "user_a", 3600).unwrap();
        let request = Request::builder()
            .uri(&uri)
            .header("Authorization", format!("Bearer {forged}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(request).await.0, StatusCode::UNAUTHORIZED);

        let expired = issue_session_token(&SecretString::from(SESSION_SECRET), "user_a", -600).unwrap();
        let request = Request::builder()
            .uri(&uri)
            .header("Cookie", format!("__session={expired}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(request).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_cookie_authenticates() {
        let app = TestApp::new().await;
        app.seed_demo().await;
        let request = Request::builder()
            .uri(format!("/api/patients/{DEMO_PATIENT_ID}"))
            .header("Cookie", format!("__session={}", token_for("user_c")))
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(request).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn demo_patient_readable_by_anyone() {
        let app = TestApp::new().await;
        app.seed_demo().await;

        let (status, body) = app
            .send(get(&format!("/api/patients/{DEMO_PATIENT_ID}"), Some("stranger")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patient"]["id"], DEMO_PATIENT_ID.to_string());
        assert!(body["patient"]["caregivers"].is_array());
    }

    #[tokio::test]
    async fn patient_access_rules() {
        let app = TestApp::new().await;
        let patient_id = onboard_patient(&app, "owner").await;
        let uri = format!("/api/patients/{patient_id}");

        assert_eq!(app.send(get(&uri, Some("owner"))).await.0, StatusCode::OK);

        let (status, body) = app.send(get(&uri, Some("someone_else"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        assert_eq!(app.send(get(&uri, None)).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_or_invalid_patient_is_not_found() {
        let app = TestApp::new().await;
        let missing = format!("/api/patients/{}", uuid::Uuid::now_v7());
        assert_eq!(app.send(get(&missing, Some("user_a"))).await.0, StatusCode::NOT_FOUND);
        assert_eq!(
            app.send(get("/api/patients/not-a-uuid/sleep", Some("user_a"))).await.0,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn dashboard_reads_for_seeded_demo() {
        let app = TestApp::new().await;
        app.seed_demo().await;
        let base = format!("/api/patients/{DEMO_PATIENT_ID}");

        let (status, body) = app
            .send(get(&format!("{base}/behavioral-metrics?days=3"), Some("user_a")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["metrics"].is_object());
        assert_eq!(body["history"].as_array().unwrap().len(), 3);

        let (status, body) = app.send(get(&format!("{base}/medications"), Some("user_a"))).await;
        assert_eq!(status, StatusCode::OK);
        let medications = body["medications"].as_array().unwrap();
        assert_eq!(medications.len(), 3);

        let (status, body) = app.send(get(&format!("{base}/activities"), Some("user_a"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["activities"].as_array().unwrap().is_empty());

        let (status, body) = app.send(get(&format!("{base}/sleep"), Some("user_a"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["sleepLogs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn metrics_for_patient_without_data_is_null() {
        let app = TestApp::new().await;
        let patient_id = onboard_patient(&app, "owner").await;
        let (status, body) = app
            .send(get(&format!("/api/patients/{patient_id}/behavioral-metrics"), Some("owner")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["metrics"].is_null());
        assert_eq!(body["history"], json!([]));
    }

    #[tokio::test]
    async fn invalid_days_is_rejected() {
        let app = TestApp::new().await;
        app.seed_demo().await;
        let (status, body) = app
            .send(get(&format!("/api/patients/{DEMO_PATIENT_ID}/sleep?days=lots"), Some("user_a")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "days");
    }

    #[tokio::test]
    async fn audio_token_without_key_is_generic_500() {
        let app = TestApp::new().await;
        let (status, body) = app.send(get("/api/audio/token", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
        assert!(!body["error"].as_str().unwrap().contains("DEEPGRAM"));
    }

    #[tokio::test]
    async fn speak_without_key_is_generic_500() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(post_json("/api/audio/speak", None, r#"{"text": "Good morning"}"#))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
        assert!(!body["error"].as_str().unwrap().contains("DEEPGRAM"));
    }

    #[tokio::test]
    async fn audio_requires_auth_when_demo_off() {
        let config = MemoraConfig {
            demo_mode: false,
            ..MemoraConfig::default()
        };
        let app = TestApp::with(config, secrets()).await;

        assert_eq!(app.send(get("/api/audio/token", None)).await.0, StatusCode::UNAUTHORIZED);
        let (status, _) = app
            .send(post_json("/api/audio/speak", None, r#"{"text": "hello"}"#))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Authenticated callers get past the gate and hit the missing key.
        let (status, _) = app.send(get("/api/audio/token", Some("user_a"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn speak_validates_text() {
        let app = TestApp::new().await;
        for body in [r#"{}"#, r#"{"text": 5}"#, r#"{"text": "   "}"#] {
            let (status, json) = app.send(post_json("/api/audio/speak", None, body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(json["field"], "text");
        }
    }

    fn livekit_app_config() -> (MemoraConfig, ServiceSecrets) {
        let mut config = MemoraConfig::default();
        config.livekit.url = Some("https://rtc.example.com".to_string());
        let secrets = ServiceSecrets {
            livekit_api_key: Some(SecretString::from("APIkey123")),
            livekit_api_secret: Some(SecretString::from(LIVEKIT_SECRET)),
            ..secrets()
        };
        (config, secrets)
    }

    #[tokio::test]
    async fn livekit_patient_room_derives_identity() {
        let (config, secrets) = livekit_app_config();
        let app = TestApp::with(config, secrets).await;

        let (status, body) = app.send(get("/api/livekit/token?roomName=patient-XYZ", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://rtc.example.com");
        assert_eq!(body["wsUrl"], "wss://rtc.example.com");

        let claims: Value =
            memora_infra::jwt::verify(body["token"].as_str().unwrap(), LIVEKIT_SECRET.as_bytes())
                .unwrap();
        assert_eq!(claims["sub"], "XYZ");
        assert_eq!(claims["name"], "XYZ");
        assert_eq!(claims["video"]["room"], "patient-XYZ");
    }

    #[tokio::test]
    async fn livekit_authenticated_user_and_display_name() {
        let (config, secrets) = livekit_app_config();
        let app = TestApp::with(config, secrets).await;

        let (status, body) = app
            .send(get("/api/livekit/token?roomName=family-room&userName=Grandpa", Some("user_g")))
            .await;
        assert_eq!(status, StatusCode::OK);
        let claims: Value =
            memora_infra::jwt::verify(body["token"].as_str().unwrap(), LIVEKIT_SECRET.as_bytes())
                .unwrap();
        assert_eq!(claims["sub"], "user_g");
        assert_eq!(claims["name"], "Grandpa");
    }

    #[tokio::test]
    async fn livekit_rejects_anonymous_other_rooms() {
        let (config, secrets) = livekit_app_config();
        let app = TestApp::with(config, secrets).await;

        assert_eq!(
            app.send(get("/api/livekit/token?roomName=lobby", None)).await.0,
            StatusCode::UNAUTHORIZED
        );
        let (status, body) = app.send(get("/api/livekit/token", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "roomName");
    }

    #[tokio::test]
    async fn livekit_without_credentials_is_500() {
        let app = TestApp::new().await;
        let (status, body) = app.send(get("/api/livekit/token?roomName=patient-XYZ", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
    }
}
