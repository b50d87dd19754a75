//! Query-string parameters shared by the read and token endpoints.

use serde::Deserialize;

/// `?days=N` on history endpoints. Clamping happens in the service.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

/// `?roomName=..&userName=..` on the room token endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTokenQuery {
    pub room_name: Option<String>,
    pub user_name: Option<String>,
}

impl RoomTokenQuery {
    /// Trimmed room name, `None` when missing or blank.
    pub fn room(&self) -> Option<&str> {
        non_blank(self.room_name.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.user_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
