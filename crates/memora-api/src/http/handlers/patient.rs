//! Patient dashboard read handlers.
//!
//! Each handler authenticates, resolves the path id and delegates to
//! [`PatientService`](memora_core::service::patient::PatientService), which
//! runs the access check before touching patient data.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use memora_core::service::patient::MetricsSummary;
use memora_types::patient::PatientId;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::HistoryQuery;
use crate::state::AppState;

/// A path id that is not a UUID cannot name a patient.
fn parse_patient_id(raw: &str) -> Result<PatientId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Patient not found".to_string()))
}

fn history(query: Result<Query<HistoryQuery>, QueryRejection>) -> Result<HistoryQuery, AppError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::validation("days", e.body_text()))
}

/// GET /api/patients/{id}
pub async fn get_patient(
    State(state): State<AppState>,
    Authenticated(user_id): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&id)?;
    let detail = state.patient_service.get_patient(&user_id, &patient_id).await?;
    Ok(Json(json!({ "patient": detail })))
}

/// GET /api/patients/{id}/behavioral-metrics?days=N
pub async fn get_behavioral_metrics(
    State(state): State<AppState>,
    Authenticated(user_id): Authenticated,
    Path(id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<MetricsSummary>, AppError> {
    let patient_id = parse_patient_id(&id)?;
    let query = history(query)?;
    let summary = state
        .patient_service
        .behavioral_metrics(&user_id, &patient_id, query.days)
        .await?;
    Ok(Json(summary))
}

/// GET /api/patients/{id}/medications - Active medications with today's doses.
pub async fn get_medications(
    State(state): State<AppState>,
    Authenticated(user_id): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&id)?;
    let today = Utc::now().date_naive();
    let medications = state
        .patient_service
        .medications(&user_id, &patient_id, today)
        .await?;
    Ok(Json(json!({ "medications": medications })))
}

/// GET /api/patients/{id}/activities?days=N
pub async fn get_activities(
    State(state): State<AppState>,
    Authenticated(user_id): Authenticated,
    Path(id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&id)?;
    let query = history(query)?;
    let activities = state
        .patient_service
        .activities(&user_id, &patient_id, query.days)
        .await?;
    Ok(Json(json!({ "activities": activities })))
}

/// GET /api/patients/{id}/sleep?days=N
pub async fn get_sleep(
    State(state): State<AppState>,
    Authenticated(user_id): Authenticated,
    Path(id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&id)?;
    let query = history(query)?;
    let sleep_logs = state
        .patient_service
        .sleep_logs(&user_id, &patient_id, query.days)
        .await?;
    Ok(Json(json!({ "sleepLogs": sleep_logs })))
}
