//! HTTP request handlers for the REST API.

pub mod audio;
pub mod health;
pub mod livekit;
pub mod onboard;
pub mod patient;
