//! # Form Submission Endpoints
//!
//! | Method | Path                                          | Operation               |
//! |--------|-----------------------------------------------|-------------------------|
//! | POST   | `/{prefix}/form-submissions/{formKey}/validate` | Validate a submission   |
//! | POST   | `/{prefix}/form-submissions/{formKey}/fields/{fieldKey}/validate` | Validate file metadata |
//! | POST   | `/{prefix}/form-submissions/{formKey}/fields/check` | Check fields exist   |
//!
//! Every endpoint requires `X-Access-Token`, which is forwarded to the form
//! provider to load the schema.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use formval_client::{CsvValidationRequest, DataFactoryError, ProviderError};
use formval_core::{find_components, ComponentKind, FileData, FileMeta, FormSchema, FormSubmission};
use formval_validation::ServiceError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::Instrument;
use utoipa::ToSchema;

use crate::error::{AppError, FieldError, TracedError};
use crate::extractors::{access_token, extract_json, extract_validated_json, Validate};
use crate::state::AppState;
use crate::trace::RequestTrace;

// -- Request / response types -------------------------------------------------

/// Submission body: `data` plus opaque passthrough fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    /// Business process the submission belongs to; enables CSV checksum
    /// verification of file fields.
    #[serde(default)]
    pub process_instance_id: Option<String>,
    #[serde(flatten)]
    pub submission: FormSubmission,
}

/// OpenAPI description of [`SubmissionRequest`].
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct SubmissionRequestDoc {
    /// Field values keyed by component key.
    #[schema(value_type = Object)]
    data: Map<String, Value>,
    process_instance_id: Option<String>,
}

/// Resolved submission data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    #[schema(value_type = Object)]
    pub data: Map<String, Value>,
}

/// Declared metadata of a file about to be uploaded.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationRequest {
    pub file_name: String,
    pub content_type: String,
    /// Size in bytes; fractional values are accepted.
    pub size: f64,
}

impl From<FieldValidationRequest> for FileMeta {
    fn from(req: FieldValidationRequest) -> Self {
        Self {
            file_name: req.file_name,
            content_type: req.content_type,
            size: req.size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationResponse {
    pub is_valid: bool,
}

/// Field names to look up in the schema.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckFieldsRequest {
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Validate for CheckFieldsRequest {
    fn validate(&self) -> Result<(), String> {
        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err("field names must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckFieldsResponse {
    pub code: u16,
    /// Field name to existence, in request order.
    #[schema(value_type = Object)]
    pub fields: IndexMap<String, bool>,
}

// -- Router -------------------------------------------------------------------

/// Build the form-submission router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/form-submissions/:form_key/validate", post(validate_submission))
        .route(
            "/form-submissions/:form_key/fields/:field_key/validate",
            post(validate_field),
        )
        .route("/form-submissions/:form_key/fields/check", post(check_fields))
}

// -- Handlers -----------------------------------------------------------------

/// POST /{prefix}/form-submissions/{formKey}/validate: validate a submission.
#[utoipa::path(
    post,
    path = "/api/form-submissions/{formKey}/validate",
    params(
        ("formKey" = String, Path, description = "UI form schema key"),
        ("X-Access-Token" = String, Header, description = "Caller access token"),
    ),
    request_body = SubmissionRequestDoc,
    responses(
        (status = 200, description = "Submission is valid", body = ValidateResponse),
        (status = 401, description = "Missing or wrong access token", body = crate::error::ErrorBody),
        (status = 404, description = "Form is not found", body = crate::error::ErrorBody),
        (status = 422, description = "Submission is invalid", body = crate::error::ErrorBody),
        (status = 500, description = "Unexpected failure", body = crate::error::ErrorBody),
    ),
    tag = "form-submissions"
)]
pub(crate) async fn validate_submission(
    State(state): State<AppState>,
    trace: RequestTrace,
    headers: HeaderMap,
    Path(form_key): Path<String>,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, TracedError> {
    async {
        let token = access_token(&headers)?;
        let request = extract_json(body)?;
        let schema = load_schema(&state, &token, &form_key).await?;

        tracing::info!(%form_key, "validating submission");
        let data = state
            .validation
            .validate(&schema, &request.submission)
            .await
            .map_err(|err| match err {
                ServiceError::Validation(err) => {
                    tracing::error!(%form_key, response_code = 422, "submission is invalid");
                    AppError::from(err)
                }
                ServiceError::Engine(reason) => {
                    AppError::internal("Unknown validation error", reason)
                }
            })?;

        if let Some(process_instance_id) = &request.process_instance_id {
            verify_csv_files(&state, &trace, &token, &schema, &request.submission, process_instance_id)
                .await?;
        }

        tracing::info!(%form_key, response_code = 200, "submission is valid");
        Ok::<_, AppError>(Json(ValidateResponse { data }))
    }
    .instrument(trace.span())
    .await
    .map_err(|err: AppError| err.traced(trace.trace_id.clone()))
}

/// POST /{prefix}/form-submissions/{formKey}/fields/{fieldKey}/validate: validate file metadata.
#[utoipa::path(
    post,
    path = "/api/form-submissions/{formKey}/fields/{fieldKey}/validate",
    params(
        ("formKey" = String, Path, description = "UI form schema key"),
        ("fieldKey" = String, Path, description = "File component key"),
        ("X-Access-Token" = String, Header, description = "Caller access token"),
    ),
    request_body = FieldValidationRequest,
    responses(
        (status = 200, description = "File metadata is acceptable", body = FieldValidationResponse),
        (status = 401, description = "Missing or wrong access token", body = crate::error::ErrorBody),
        (status = 404, description = "Form is not found", body = crate::error::ErrorBody),
        (status = 422, description = "File metadata is not acceptable", body = crate::error::ErrorBody),
    ),
    tag = "form-submissions"
)]
pub(crate) async fn validate_field(
    State(state): State<AppState>,
    trace: RequestTrace,
    headers: HeaderMap,
    Path((form_key, field_key)): Path<(String, String)>,
    body: Result<Json<FieldValidationRequest>, JsonRejection>,
) -> Result<Json<FieldValidationResponse>, TracedError> {
    async {
        let token = access_token(&headers)?;
        let meta: FileMeta = extract_json(body)?.into();
        let schema = load_schema(&state, &token, &form_key).await?;

        state
            .validation
            .validate_file_meta(&schema, &field_key, &meta)
            .map_err(|err| {
                if err.is_client_error() {
                    tracing::warn!(%form_key, %field_key, response_code = 422, "file metadata is not valid: {err}");
                } else {
                    tracing::error!(%form_key, %field_key, response_code = 422, "file constraint in form schema is unusable: {err}");
                }
                AppError::Validation(vec![FieldError::new(&field_key, err.to_string())])
            })?;

        tracing::info!(%form_key, %field_key, response_code = 200, "file metadata is valid");
        Ok::<_, AppError>(Json(FieldValidationResponse { is_valid: true }))
    }
    .instrument(trace.span())
    .await
    .map_err(|err: AppError| err.traced(trace.trace_id.clone()))
}

/// POST /{prefix}/form-submissions/{formKey}/fields/check: check fields exist.
#[utoipa::path(
    post,
    path = "/api/form-submissions/{formKey}/fields/check",
    params(
        ("formKey" = String, Path, description = "UI form schema key"),
        ("X-Access-Token" = String, Header, description = "Caller access token"),
    ),
    request_body = CheckFieldsRequest,
    responses(
        (status = 200, description = "All fields exist", body = CheckFieldsResponse),
        (status = 401, description = "Missing or wrong access token", body = crate::error::ErrorBody),
        (status = 404, description = "Form is not found", body = crate::error::ErrorBody),
        (status = 422, description = "Some fields do not exist", body = crate::error::ErrorBody),
    ),
    tag = "form-submissions"
)]
pub(crate) async fn check_fields(
    State(state): State<AppState>,
    trace: RequestTrace,
    headers: HeaderMap,
    Path(form_key): Path<String>,
    body: Result<Json<CheckFieldsRequest>, JsonRejection>,
) -> Result<Json<CheckFieldsResponse>, TracedError> {
    async {
        let token = access_token(&headers)?;
        let request = extract_validated_json(body)?;
        let schema = load_schema(&state, &token, &form_key).await?;

        let fields = state.validation.check_fields_existence(&schema, &request.fields);
        let missing: Vec<FieldError> = fields
            .iter()
            .filter(|(_, exists)| !**exists)
            .map(|(field, _)| FieldError::new(field, format!("Field \"{field}\" does not exist!")))
            .collect();

        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().filter_map(|e| e.field.as_deref()).collect();
            tracing::error!(
                %form_key,
                response_code = 422,
                "form does not have fields: {}",
                names.join(", ")
            );
            return Err(AppError::Validation(missing));
        }

        tracing::info!(%form_key, response_code = 200, "requested fields exist");
        Ok::<_, AppError>(Json(CheckFieldsResponse { code: 200, fields }))
    }
    .instrument(trace.span())
    .await
    .map_err(|err: AppError| err.traced(trace.trace_id.clone()))
}

// -- Helpers ------------------------------------------------------------------

async fn load_schema(
    state: &AppState,
    token: &str,
    form_key: &str,
) -> Result<FormSchema, AppError> {
    tracing::info!(%form_key, "loading schema");
    state
        .provider
        .get_form(token, form_key)
        .await
        .map_err(|err| match err {
            ProviderError::InvalidToken => {
                tracing::error!(response_code = 401, "wrong access token");
                AppError::Unauthorized("Wrong access token!".into())
            }
            ProviderError::FormNotFound(_) => {
                tracing::error!(%form_key, response_code = 404, "schema is not found");
                AppError::NotFound("Form is not found!".into())
            }
            other => AppError::internal("Unknown error while getting the form", other),
        })
}

/// Verify every submitted file bound to a component with `resourceValidation`.
///
/// Fields without a complete `{id, checksum}` reference are skipped; the
/// rule engine has already decided whether they were required.
async fn verify_csv_files(
    state: &AppState,
    trace: &RequestTrace,
    token: &str,
    schema: &FormSchema,
    submission: &FormSubmission,
    process_instance_id: &str,
) -> Result<(), AppError> {
    let Some(components) = find_components(&schema.components, |c| {
        c.kind() == ComponentKind::File && c.resource_validation.is_some()
    }) else {
        return Ok(());
    };

    let Some(data_factory) = &state.data_factory else {
        tracing::warn!(
            fields = components.len(),
            "CSV checksum verification skipped: data factory not configured"
        );
        return Ok(());
    };

    for component in components {
        let (Some(key), Some(entity)) = (&component.key, &component.resource_validation) else {
            continue;
        };
        let Some(file) = submission.data.get(key).and_then(FileData::from_value) else {
            continue;
        };
        if !file.is_complete() {
            continue;
        }

        let request = CsvValidationRequest {
            entity: entity.clone(),
            process_instance_id: process_instance_id.to_string(),
            access_token: token.to_string(),
            file,
            trace: Some(trace.context()),
        };
        data_factory
            .validate_csv_file(&request)
            .await
            .map_err(|err| match err {
                DataFactoryError::InvalidCsvFile(body) => {
                    tracing::error!(field = %key, response_code = 422, "csv file is invalid");
                    AppError::InvalidCsvFile(body)
                }
                DataFactoryError::Client(err) => AppError::internal("Unknown validation error", err),
            })?;
    }
    Ok(())
}
