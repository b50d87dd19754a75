//! Application error type mapping to HTTP status codes.
//!
//! Body shape: `{"error": <message>, "code": <CODE>}`, plus `field` for
//! validation failures. Upstream and internal details are logged here and
//! replaced by a generic message before reaching the client.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use memora_types::error::{
    AuthError, OnboardingError, PatientError, RoomTokenError, SpeechError, ValidationError,
};

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    Validation(ValidationError),
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    /// A third-party provider failed or is not configured.
    Upstream { provider: &'static str, detail: String },
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::new(field, message))
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Unauthorized(match e {
            AuthError::Missing => "Authentication required".to_string(),
            _ => "Invalid or expired session".to_string(),
        })
    }
}

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
            PatientError::Forbidden => {
                AppError::Forbidden("You do not have access to this patient".to_string())
            }
            PatientError::StorageError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<OnboardingError> for AppError {
    fn from(e: OnboardingError) -> Self {
        match e {
            OnboardingError::AlreadyOnboarded(_) => {
                AppError::Conflict("This account has already been onboarded".to_string())
            }
            OnboardingError::StorageError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<SpeechError> for AppError {
    fn from(e: SpeechError) -> Self {
        AppError::Upstream {
            provider: "deepgram",
            detail: e.to_string(),
        }
    }
}

impl From<RoomTokenError> for AppError {
    fn from(e: RoomTokenError) -> Self {
        AppError::Upstream {
            provider: "livekit",
            detail: e.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::validation("body", e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::validation("query", e.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            AppError::Validation(v) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                v.message,
                Some(v.field),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            AppError::Upstream { provider, detail } => {
                tracing::error!(provider, error = %detail, "upstream provider failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "A required service is unavailable. Please try again later.".to_string(),
                    None,
                )
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "error": message, "code": code });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}
