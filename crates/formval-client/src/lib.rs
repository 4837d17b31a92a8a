//! # formval-client -- Typed clients for form-submission collaborators
//!
//! Three external systems sit behind traits the API layer depends on:
//!
//! - **Form provider**: loads a form schema by key ([`SchemaProvider`]).
//!   [`HttpFormProvider`] calls the remote provider; [`MockedFormProvider`]
//!   serves schemas from memory for local development and tests.
//! - **Data factory**: confirms an uploaded CSV file's checksum server-side
//!   ([`CsvChecksumService`], [`DataFactoryClient`]).
//! - **Rule engine**: [`HttpRuleEngine`] implements
//!   [`formval_validation::RuleEngine`] over HTTP.
//!
//! ## Transport policy
//!
//! Every outbound request shares one `reqwest::Client` with the configured
//! timeout and is retried with exponential backoff on transport errors
//! only. Non-2xx responses are never retried.

pub mod config;
pub mod data_factory;
pub mod error;
pub mod form_provider;
pub(crate) mod retry;
pub mod rule_engine;
pub mod trace;

pub use config::{ClientConfig, ConfigError};
pub use data_factory::{CsvChecksumService, CsvValidationRequest, DataFactoryClient};
pub use error::{ClientError, DataFactoryError, ProviderError};
pub use form_provider::{HttpFormProvider, MockedFormProvider, SchemaProvider};
pub use rule_engine::HttpRuleEngine;
pub use trace::{TraceContext, REQUEST_ID_HEADER, SPAN_ID_HEADER, TRACE_ID_HEADER};

use std::time::Duration;

/// Header carrying the caller's access token to collaborators.
pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Build the shared HTTP client with the configured timeout.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ClientError::Http {
            endpoint: "client_init".into(),
            source: e,
        })
}

/// Join `path` onto `base`, tolerating a trailing slash on the base.
pub(crate) fn endpoint_url(base: &url::Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Read a non-2xx response into [`ClientError::ApiError`].
pub(crate) async fn api_error(endpoint: &str, resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ClientError::ApiError {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}
