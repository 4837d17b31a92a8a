//! # Request Trace Context
//!
//! Every request carries a trace id used in logs, error bodies and
//! outbound collaborator calls. It is taken from `X-B3-TraceId`, falling
//! back to `X-Request-Id`, and minted fresh when neither is present.
//! All three identifiers are recorded on the request's `tracing` span and
//! forwarded to the data factory.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use formval_client::TraceContext;

pub use formval_client::{REQUEST_ID_HEADER, SPAN_ID_HEADER, TRACE_ID_HEADER};

/// Trace identifiers of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTrace {
    pub trace_id: String,
    pub span_id: String,
    pub request_id: String,
}

impl RequestTrace {
    /// Read trace identifiers from headers, minting any that are missing.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let request_id = header(REQUEST_ID_HEADER);
        let trace_id = header(TRACE_ID_HEADER)
            .or_else(|| request_id.clone())
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let span_id = header(SPAN_ID_HEADER).unwrap_or_else(|| {
            let mut id = uuid::Uuid::new_v4().simple().to_string();
            id.truncate(16);
            id
        });

        Self {
            trace_id,
            span_id,
            request_id: request_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Span every handler log line is recorded under.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            trace_id = %self.trace_id,
            span_id = %self.span_id,
            request_id = %self.request_id,
        )
    }

    /// Identifiers to forward on outbound collaborator calls.
    pub fn context(&self) -> TraceContext {
        TraceContext {
            trace_id: self.trace_id.clone(),
            span_id: self.span_id.clone(),
            request_id: self.request_id.clone(),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestTrace {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
