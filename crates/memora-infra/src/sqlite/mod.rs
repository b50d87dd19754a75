//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use memora_types::error::RepositoryError;

pub mod care;
pub mod caregiver;
pub mod metrics;
pub mod patient;
pub mod pool;

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime '{s}': {e}")))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, RepositoryError> {
    s.parse()
        .map_err(|e| RepositoryError::Query(format!("invalid date '{s}': {e}")))
}

pub(crate) fn parse_id<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, RepositoryError>
where
    T::Err: std::fmt::Display,
{
    s.parse()
        .map_err(|e| RepositoryError::Query(format!("invalid {what} id '{s}': {e}")))
}

pub(crate) fn to_u32(value: i64, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::Query(format!("{column} out of range: {value}")))
}

/// Map a write error, turning UNIQUE violations into `Conflict`.
pub(crate) fn map_write_error(e: sqlx::Error, conflict: impl FnOnce() -> String) -> RepositoryError {
    match e {
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
            RepositoryError::Conflict(conflict())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

pub(crate) fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}
