//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! implements. Services are generic over them.

pub mod care;
pub mod caregiver;
pub mod metrics;
pub mod patient;
