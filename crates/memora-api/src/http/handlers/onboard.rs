//! Account onboarding handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use memora_types::onboarding::{OnboardingOutcome, OnboardingRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::state::AppState;

/// POST /api/onboard - Create the patient or caregiver record for the caller.
///
/// Authentication is checked before the body is parsed, so an anonymous
/// request with a bad payload is still a 401.
pub async fn onboard(
    State(state): State<AppState>,
    Authenticated(user_id): Authenticated,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<OnboardingOutcome>), AppError> {
    let Json(body) = body?;
    let request = OnboardingRequest::from_json(&body)?;

    let role = request.role();
    let outcome = state.onboarding_service.onboard(&user_id, request).await?;

    tracing::info!(
        user_id = %user_id,
        role = %role,
        record_id = %outcome.user_id,
        provisioning_warning = outcome.warning.is_some(),
        "onboarding complete"
    );

    Ok((StatusCode::CREATED, Json(outcome)))
}
