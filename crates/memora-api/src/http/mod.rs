//! HTTP/REST API layer for Memora.
//!
//! Axum-based REST API at `/api/` with session-token authentication and
//! open CORS for the web dashboard.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
