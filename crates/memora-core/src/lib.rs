//! Business logic and port definitions for Memora.
//!
//! This crate defines the repository and provider traits that the
//! infrastructure layer implements. It depends only on `memora-types`, never
//! on `memora-infra` or any database/IO crate.

pub mod agent;
pub mod auth;
pub mod repository;
pub mod room;
pub mod seed;
pub mod service;
pub mod speech;
