//! Infrastructure layer for Memora.
//!
//! Implements the ports defined in `memora-core`: SQLite repositories, the
//! Letta, Deepgram and LiveKit clients, session verification, and config
//! loading.

pub mod config;
pub mod deepgram;
pub mod jwt;
pub mod letta;
pub mod livekit;
pub mod session;
pub mod sqlite;

#[cfg(test)]
mod testing;
