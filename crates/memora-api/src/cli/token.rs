//! `memora token`: mint a session token for local development.

use anyhow::{bail, Result};
use console::style;

use memora_infra::config::ServiceSecrets;
use memora_infra::session::issue_session_token;

pub fn token(user_id: &str, ttl: i64, json: bool) -> Result<()> {
    if user_id.trim().is_empty() {
        bail!("user id cannot be empty");
    }
    if ttl <= 0 {
        bail!("--ttl must be positive");
    }

    let secrets = ServiceSecrets::from_env();
    let Some(secret) = secrets.session_secret else {
        bail!("MEMORA_SESSION_SECRET is not set");
    };

    let token = issue_session_token(&secret, user_id.trim(), ttl)?;

    if json {
        let out = serde_json::json!({ "user_id": user_id.trim(), "expires_in": ttl, "token": token });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        eprintln!(
            "  {} Session token for {} (valid {}s):",
            style("🔑").bold(),
            style(user_id.trim()).cyan(),
            ttl
        );
        println!("{token}");
    }
    Ok(())
}
