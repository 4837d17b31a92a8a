//! # API Error Types
//!
//! [`AppError`] maps collaborator and validation failures to HTTP status
//! codes. [`TracedError`] pairs it with the request's trace id so every
//! error body can be correlated with the logs.
//!
//! Body shape: `{ traceId, code, message, details? }`. Validation failures
//! put per-field entries under `details.errors`. A CSV file rejected by the
//! data factory is relayed with the upstream body instead. Internal error
//! messages are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formval_core::{FormValidationError, ValidationErrorDetail};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Per-field failures of a 422 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetails {
    pub errors: Vec<FieldError>,
}

/// One field failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// JSON encoding of the offending value, when the rule engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            value: None,
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl From<&ValidationErrorDetail> for FieldError {
    fn from(detail: &ValidationErrorDetail) -> Self {
        Self {
            value: Some(detail.context.value.to_string()),
            field: detail.context.key.clone(),
            message: detail.message.clone(),
        }
    }
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or rejected access token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Form schema not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Request body could not be parsed (400).
    #[error("{0}")]
    BadRequest(String),

    /// Submission failed validation (422).
    #[error("submission failed validation with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The data factory rejected an uploaded CSV file (422). Carries the
    /// upstream response body.
    #[error("invalid CSV file: {0}")]
    InvalidCsvFile(String),

    /// Unexpected failure (500). `public` is returned, `detail` only logged.
    #[error("{public}: {detail}")]
    Internal {
        public: &'static str,
        detail: String,
    },
}

impl AppError {
    /// Create an internal error with a public message and a logged detail.
    pub fn internal(public: &'static str, detail: impl ToString) -> Self {
        Self::Internal {
            public,
            detail: detail.to_string(),
        }
    }

    /// Return the HTTP status code and machine-readable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::InvalidCsvFile(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CSV_FILE"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Attach the request trace id.
    pub fn traced(self, trace_id: impl Into<String>) -> TracedError {
        TracedError {
            trace_id: Some(trace_id.into()),
            error: self,
        }
    }

    fn into_body(self, trace_id: Option<String>) -> (StatusCode, serde_json::Value) {
        let (status, code) = self.status_and_code();

        let (message, details) = match self {
            Self::Validation(errors) => (None, Some(ErrorDetails { errors })),
            Self::InvalidCsvFile(body) => {
                // Relay the upstream body when it is JSON; wrap it otherwise.
                if let Ok(upstream) = serde_json::from_str::<serde_json::Value>(&body) {
                    if upstream.is_object() {
                        return (status, upstream);
                    }
                }
                (Some(body), None)
            }
            Self::Internal { public, .. } => (Some(public.to_string()), None),
            other => (Some(other.to_string()), None),
        };

        let body = ErrorBody {
            trace_id,
            code: code.to_string(),
            message,
            details,
        };
        (
            status,
            serde_json::to_value(body).unwrap_or(serde_json::Value::Null),
        )
    }
}

/// Rule-engine failures become 422 with one entry per detail; everything
/// else the core raises is a single-message 422.
impl From<FormValidationError> for AppError {
    fn from(err: FormValidationError) -> Self {
        match &err {
            FormValidationError::ValidationFailed(details) => {
                Self::Validation(details.iter().map(FieldError::from).collect())
            }
            other => Self::Validation(vec![FieldError {
                value: None,
                field: None,
                message: other.to_string(),
            }]),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        TracedError {
            trace_id: None,
            error: self,
        }
        .into_response()
    }
}

/// An [`AppError`] bound to a request trace id.
#[derive(Debug)]
pub struct TracedError {
    pub trace_id: Option<String>,
    pub error: AppError,
}

impl IntoResponse for TracedError {
    fn into_response(self) -> Response {
        if let AppError::Internal { public, detail } = &self.error {
            tracing::error!(trace_id = ?self.trace_id, %public, %detail, "internal server error");
        }
        let (status, body) = self.error.into_body(self.trace_id);
        (status, Json(body)).into_response()
    }
}
