//! CLI command definitions for the `memora` binary.
//!
//! Uses clap derive macros for argument parsing. `serve` runs the REST API;
//! the other commands are operator tools around the same data directory.

pub mod seed;
pub mod token;
pub mod voice_agent;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Backend for the Memora dementia-care companion.
#[derive(Parser)]
#[command(name = "memora", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed logs (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "MEMORA_LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "MEMORA_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to config `server.port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Write deterministic demo data for the demo patient.
    Seed {
        /// Link a caregiver account for this auth user id to the demo patient.
        #[arg(long, value_name = "USER_ID")]
        link_caregiver: Option<String>,

        /// Days of history to generate.
        #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=90))]
        days: u32,
    },

    /// Run the conversational voice agent worker.
    #[command(name = "voice-agent")]
    VoiceAgent {
        /// Room to join (defaults to the demo patient's room).
        #[arg(long)]
        room: Option<String>,
    },

    /// Mint a development session token signed with MEMORA_SESSION_SECRET.
    Token {
        /// Auth user id to put in the `sub` claim.
        user_id: String,

        /// Lifetime in seconds.
        #[arg(long, default_value = "3600")]
        ttl: i64,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["memora", "seed"]).unwrap();
        match cli.command {
            Commands::Seed { link_caregiver, days } => {
                assert_eq!(days, 7);
                assert!(link_caregiver.is_none());
            }
            _ => panic!("expected seed"),
        }
    }

    #[test]
    fn test_seed_days_out_of_range() {
        assert!(Cli::try_parse_from(["memora", "seed", "--days", "0"]).is_err());
        assert!(Cli::try_parse_from(["memora", "seed", "--days", "91"]).is_err());
    }

    #[test]
    fn test_voice_agent_room() {
        let cli = Cli::try_parse_from(["memora", "-v", "voice-agent", "--room", "patient-1"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::VoiceAgent { room: Some(ref r) } if r == "patient-1"
        ));
    }
}
