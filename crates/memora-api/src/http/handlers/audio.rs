//! Speech endpoints: browser transcription tokens and text-to-speech.
//!
//! Both accept anonymous callers while `demo_mode` is on.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use tracing::Instrument;

use memora_core::speech::{validate_speech_text, SpeechProvider, SpeechToken};
use memora_observe::provider_attrs::{
    provider_span, OP_GRANT_TOKEN, OP_SYNTHESIZE, PROVIDER_DEEPGRAM,
};
use memora_types::patient::UserId;

use crate::http::error::AppError;
use crate::http::extractors::auth::MaybeAuthenticated;
use crate::state::AppState;

/// Anonymous callers pass only in demo mode.
fn require_caller(state: &AppState, user: Option<UserId>) -> Result<Option<UserId>, AppError> {
    if user.is_none() && !state.config.demo_mode {
        return Err(AppError::Unauthorized("Authentication required".to_string()));
    }
    Ok(user)
}

/// GET /api/audio/token - Short-lived transcription token.
pub async fn get_token(
    State(state): State<AppState>,
    MaybeAuthenticated(user): MaybeAuthenticated,
) -> Result<Json<SpeechToken>, AppError> {
    let user = require_caller(&state, user)?;

    let token = state
        .speech
        .grant_token()
        .instrument(provider_span(PROVIDER_DEEPGRAM, OP_GRANT_TOKEN))
        .await?;

    tracing::debug!(
        user_id = user.as_ref().map(|u| u.as_str()).unwrap_or("anonymous"),
        expires_in = token.expires_in,
        "issued transcription token"
    );
    Ok(Json(token))
}

/// POST /api/audio/speak - Synthesize `{text}` into MP3 audio.
pub async fn speak(
    State(state): State<AppState>,
    MaybeAuthenticated(user): MaybeAuthenticated,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_caller(&state, user)?;
    let Json(body) = body?;

    let text = match body.get("text") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s.as_str()),
        Some(_) => return Err(AppError::validation("text", "text must be a string")),
    };
    let text = validate_speech_text(text)?;

    let audio = state
        .speech
        .synthesize(text)
        .instrument(provider_span(PROVIDER_DEEPGRAM, OP_SYNTHESIZE))
        .await?;

    Ok((
        [(CONTENT_TYPE, "audio/mpeg"), (CACHE_CONTROL, "no-store")],
        audio,
    ))
}
