//! Request extractors: session identity and typed query strings.

pub mod auth;
pub mod query;
