//! Observability setup for Memora: subscriber initialization and span
//! conventions for outbound provider calls.

pub mod provider_attrs;
pub mod tracing_setup;
