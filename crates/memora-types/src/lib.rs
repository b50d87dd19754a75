//! Shared domain types for Memora.
//!
//! Patients, caregivers, care records, behavioral metrics, the onboarding
//! payload and the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod care;
pub mod caregiver;
pub mod config;
pub mod error;
pub mod metrics;
pub mod onboarding;
pub mod patient;
