//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`. Paths are documented under the default `api`
//! prefix.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the form-submission API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Form Submission Validation API",
        version = "0.1.0",
        description = "Validates form submissions against UI form schemas: rule-engine validation, file metadata checks and field existence checks.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::form_submissions::validate_submission,
        crate::routes::form_submissions::validate_field,
        crate::routes::form_submissions::check_fields,
    ),
    components(schemas(
        crate::routes::form_submissions::SubmissionRequestDoc,
        crate::routes::form_submissions::ValidateResponse,
        crate::routes::form_submissions::FieldValidationRequest,
        crate::routes::form_submissions::FieldValidationResponse,
        crate::routes::form_submissions::CheckFieldsRequest,
        crate::routes::form_submissions::CheckFieldsResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetails,
        crate::error::FieldError,
    )),
    tags(
        (name = "form-submissions", description = "Submission validation against form schemas"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
