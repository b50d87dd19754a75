//! `memora voice-agent`: worker process for the realtime voice companion.
//!
//! Only the process lifecycle exists today: startup logging, a heartbeat
//! and clean shutdown on Ctrl+C or SIGTERM. No audio is processed.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use memora_core::room::PATIENT_ROOM_PREFIX;
use memora_infra::config::{configured_services, load_config, ServiceSecrets};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub async fn run(data_dir: &Path, room: Option<String>) -> Result<()> {
    let config = load_config(data_dir).await;
    let secrets = ServiceSecrets::from_env();
    let room = room.unwrap_or_else(|| format!("{PATIENT_ROOM_PREFIX}{}", config.demo_patient_id()));

    let services = configured_services(&config, &secrets);
    tracing::info!(
        room = %room,
        services = ?services,
        livekit_url = config.livekit.url.as_deref().unwrap_or("unset"),
        "voice agent starting"
    );
    for required in ["deepgram", "livekit", "letta"] {
        if !services.contains(&required) {
            tracing::warn!(service = required, "not configured, voice pipeline will be unavailable");
        }
    }

    let shutdown = crate::shutdown_signal();
    tokio::pin!(shutdown);

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut beats: u64 = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = heartbeat.tick() => {
                beats += 1;
                tracing::debug!(room = %room, beats, "voice agent idle");
            }
        }
    }

    tracing::info!(room = %room, "voice agent stopped");
    Ok(())
}
