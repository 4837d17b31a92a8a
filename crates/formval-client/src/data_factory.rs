//! # Data Factory CSV Checksum Client
//!
//! File components with a `resourceValidation` entity name have their
//! uploaded CSV verified by the data factory before a submission is
//! accepted.
//!
//! | Method | Path                        | Outcome                          |
//! |--------|-----------------------------|----------------------------------|
//! | POST   | `/{entity}/csv/validation`  | 2xx accepted, else invalid file  |
//!
//! Any non-2xx reply is treated as an invalid file; its body is relayed to
//! the API client unchanged.

use formval_core::FileData;
use formval_validation::BoxFuture;
use serde::Serialize;

use crate::error::{ClientError, DataFactoryError};
use crate::{endpoint_url, TraceContext, ACCESS_TOKEN_HEADER};

/// Header naming the business process the file belongs to.
pub const PROCESS_INSTANCE_HEADER: &str = "X-Source-Business-Process-Instance-Id";

/// One CSV checksum verification.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvValidationRequest {
    /// Entity name from the component's `resourceValidation`.
    pub entity: String,
    pub process_instance_id: String,
    pub access_token: String,
    pub file: FileData,
    /// Identifiers of the inbound request, forwarded as B3 headers.
    pub trace: Option<TraceContext>,
}

#[derive(Serialize)]
struct CsvValidationBody<'a> {
    id: Option<&'a str>,
    checksum: Option<&'a str>,
}

/// Server-side verification of uploaded CSV files.
pub trait CsvChecksumService: Send + Sync {
    fn validate_csv_file<'a>(
        &'a self,
        request: &'a CsvValidationRequest,
    ) -> BoxFuture<'a, Result<(), DataFactoryError>>;
}

/// Client for the data-factory service.
#[derive(Debug, Clone)]
pub struct DataFactoryClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl DataFactoryClient {
    pub fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Calls `POST {base_url}/{entity}/csv/validation` with `{id, checksum}`.
    pub async fn validate(&self, request: &CsvValidationRequest) -> Result<(), DataFactoryError> {
        let endpoint = format!("POST /{}/csv/validation", request.entity);
        let url = endpoint_url(&self.base_url, &format!("{}/csv/validation", request.entity));
        let body = CsvValidationBody {
            id: request.file.id.as_deref(),
            checksum: request.file.checksum.as_deref(),
        };

        let resp = crate::retry::retry_send(&endpoint, || {
            let mut builder = self
                .http
                .post(&url)
                .header(ACCESS_TOKEN_HEADER, &request.access_token)
                .header(PROCESS_INSTANCE_HEADER, &request.process_instance_id)
                .json(&body);
            if let Some(trace) = &request.trace {
                builder = trace.apply(builder);
            }
            builder.send()
        })
        .await
        .map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status, "data factory rejected CSV file");
            return Err(DataFactoryError::InvalidCsvFile(body));
        }
        Ok(())
    }
}

impl CsvChecksumService for DataFactoryClient {
    fn validate_csv_file<'a>(
        &'a self,
        request: &'a CsvValidationRequest,
    ) -> BoxFuture<'a, Result<(), DataFactoryError>> {
        Box::pin(self.validate(request))
    }
}
