//! Realtime room access: who may join which room, and the token port.
//!
//! Patients join the room named `patient-<id>`. Anonymous callers are allowed
//! only into such a room and are identified by the id embedded in its name.

use serde::Serialize;

use memora_types::error::RoomTokenError;
use memora_types::patient::UserId;

/// Prefix of the per-patient conversation room.
pub const PATIENT_ROOM_PREFIX: &str = "patient-";

/// What a room token allows its bearer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGrant {
    pub room: String,
    pub identity: String,
    /// Display name shown to other participants.
    pub name: String,
}

/// A signed room-join credential plus where to connect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomToken {
    pub token: String,
    pub url: String,
    pub ws_url: String,
}

pub trait RoomTokenIssuer: Send + Sync {
    fn issue(&self, grant: &RoomGrant) -> Result<RoomToken, RoomTokenError>;
}

/// The patient id embedded in a `patient-<id>` room name.
pub fn identity_from_room_name(room: &str) -> Option<&str> {
    room.strip_prefix(PATIENT_ROOM_PREFIX)
        .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
}

/// Identity to put in a room token: the authenticated user when present,
/// otherwise the id embedded in a patient room name.
pub fn resolve_room_identity(user: Option<&UserId>, room: &str) -> Option<String> {
    match user {
        Some(user) => Some(user.to_string()),
        None => identity_from_room_name(room).map(str::to_string),
    }
}

/// Map an `http(s)` server URL to its `ws(s)` equivalent.
pub fn to_ws_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}
