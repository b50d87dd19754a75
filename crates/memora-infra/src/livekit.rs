//! LiveKit access tokens.
//!
//! LiveKit accepts HS256 JWTs signed with the project API secret. The `iss`
//! claim carries the API key and the `video` claim scopes the token to one
//! room.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use memora_core::room::{to_ws_url, RoomGrant, RoomToken, RoomTokenIssuer};
use memora_types::config::LiveKitSettings;
use memora_types::error::RoomTokenError;

use crate::jwt;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoGrant<'a> {
    room: &'a str,
    room_join: bool,
    can_publish: bool,
    can_subscribe: bool,
    can_publish_data: bool,
}

#[derive(Debug, Serialize)]
struct AccessClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    name: &'a str,
    nbf: i64,
    exp: i64,
    video: VideoGrant<'a>,
}

pub struct LiveKitTokenIssuer {
    api_key: Option<SecretString>,
    api_secret: Option<SecretString>,
    url: Option<String>,
    ttl_secs: i64,
}

impl LiveKitTokenIssuer {
    pub fn new(settings: &LiveKitSettings, api_key: Option<SecretString>, api_secret: Option<SecretString>) -> Self {
        Self {
            api_key,
            api_secret,
            url: settings.url.clone(),
            ttl_secs: i64::try_from(settings.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }
}

impl RoomTokenIssuer for LiveKitTokenIssuer {
    fn issue(&self, grant: &RoomGrant) -> Result<RoomToken, RoomTokenError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(RoomTokenError::NotConfigured("LIVEKIT_API_KEY"))?;
        let api_secret = self
            .api_secret
            .as_ref()
            .ok_or(RoomTokenError::NotConfigured("LIVEKIT_API_SECRET"))?;
        let url = self
            .url
            .as_deref()
            .ok_or(RoomTokenError::NotConfigured("LIVEKIT_URL"))?;

        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            iss: api_key.expose_secret(),
            sub: &grant.identity,
            name: &grant.name,
            nbf: now,
            exp: now.saturating_add(self.ttl_secs),
            video: VideoGrant {
                room: &grant.room,
                room_join: true,
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
            },
        };

        let token = jwt::sign(&claims, api_secret.expose_secret().as_bytes())
            .map_err(|e| RoomTokenError::Signing(e.to_string()))?;

        tracing::debug!(room = %grant.room, identity = %grant.identity, "room token issued");
        Ok(RoomToken {
            token,
            url: url.to_string(),
            ws_url: to_ws_url(url),
        })
    }
}
