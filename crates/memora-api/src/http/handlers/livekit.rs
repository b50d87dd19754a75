//! Realtime room token endpoint.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use memora_core::room::{resolve_room_identity, RoomGrant, RoomToken, RoomTokenIssuer};
use memora_observe::provider_attrs::{provider_span, OP_ISSUE_ROOM_TOKEN, PROVIDER_LIVEKIT};

use crate::http::error::AppError;
use crate::http::extractors::auth::MaybeAuthenticated;
use crate::http::extractors::query::RoomTokenQuery;
use crate::state::AppState;

/// GET /api/livekit/token?roomName=..&userName=..
///
/// Authenticated callers may join any room. Anonymous callers may join only
/// a `patient-<id>` room, under identity `<id>`.
pub async fn get_token(
    State(state): State<AppState>,
    MaybeAuthenticated(user): MaybeAuthenticated,
    query: Result<Query<RoomTokenQuery>, QueryRejection>,
) -> Result<Json<RoomToken>, AppError> {
    let Query(query) = query?;
    let room = query
        .room()
        .ok_or_else(|| AppError::validation("roomName", "roomName is required"))?;

    let identity = resolve_room_identity(user.as_ref(), room).ok_or_else(|| {
        AppError::Unauthorized("Sign in or join a patient room".to_string())
    })?;
    let name = query.display_name().unwrap_or(&identity).to_string();

    let grant = RoomGrant {
        room: room.to_string(),
        identity,
        name,
    };

    let token = provider_span(PROVIDER_LIVEKIT, OP_ISSUE_ROOM_TOKEN)
        .in_scope(|| state.rooms.issue(&grant))?;

    tracing::info!(room = %grant.room, identity = %grant.identity, "issued room token");
    Ok(Json(token))
}
