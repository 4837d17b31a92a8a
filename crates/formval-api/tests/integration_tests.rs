//! Integration tests for the form-submission API.
//!
//! Exercise the assembled router with in-memory collaborators: a mocked
//! form provider, a scripted rule engine and a recording data factory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use formval_api::state::{AppConfig, AppState};
use formval_client::{
    CsvChecksumService, CsvValidationRequest, DataFactoryError, MockedFormProvider, ProviderError,
    SchemaProvider,
};
use formval_core::{FormSchema, FormSubmission, ValidationErrorDetail};
use formval_validation::{BoxFuture, RuleEngine, RuleEngineError};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

const FORM: &str = "registration";
const TOKEN: &str = "token-1";

// -- Collaborators --------------------------------------------------------------

/// Rejects submissions without a `name`; otherwise echoes the data with a
/// derived `greeting`.
struct ScriptedEngine;

impl RuleEngine for ScriptedEngine {
    fn evaluate<'a>(
        &'a self,
        _schema: &'a FormSchema,
        submission: &'a FormSubmission,
    ) -> BoxFuture<'a, Result<Map<String, Value>, RuleEngineError>> {
        Box::pin(async move {
            match submission.data.get("name").and_then(Value::as_str) {
                Some("boom") => Err(RuleEngineError::Engine("engine crashed".into())),
                Some(name) if !name.is_empty() => {
                    let mut data = submission.data.clone();
                    data.insert("greeting".into(), json!(format!("Hello, {name}")));
                    Ok(data)
                }
                _ => {
                    let detail: ValidationErrorDetail = serde_json::from_value(json!({
                        "message": "Name is &lt;required&gt;",
                        "path": ["name"],
                        "context": {"key": "name", "value": ""}
                    }))
                    .unwrap();
                    Err(RuleEngineError::Validation(vec![detail]))
                }
            }
        })
    }
}

/// Records every request; rejects files whose checksum is `bad`.
#[derive(Default)]
struct RecordingDataFactory {
    calls: Mutex<Vec<CsvValidationRequest>>,
}

impl CsvChecksumService for RecordingDataFactory {
    fn validate_csv_file<'a>(
        &'a self,
        request: &'a CsvValidationRequest,
    ) -> BoxFuture<'a, Result<(), DataFactoryError>> {
        self.calls.lock().push(request.clone());
        let bad = request.file.checksum.as_deref() == Some("bad");
        Box::pin(async move {
            if bad {
                Err(DataFactoryError::InvalidCsvFile(
                    r#"{"code":"CSV_CHECKSUM_MISMATCH","message":"Checksum mismatch"}"#.into(),
                ))
            } else {
                Ok(())
            }
        })
    }
}

/// Provider that rejects every token.
struct RejectingProvider;

impl SchemaProvider for RejectingProvider {
    fn get_form<'a>(
        &'a self,
        _token: &'a str,
        _form_key: &'a str,
    ) -> BoxFuture<'a, Result<FormSchema, ProviderError>> {
        Box::pin(async { Err(ProviderError::InvalidToken) })
    }
}

fn schema() -> FormSchema {
    serde_json::from_value(json!({
        "components": [
            {"type": "textfield", "key": "name"},
            {"type": "day", "key": "birthday", "dayFirst": true},
            {"type": "panel", "components": [
                {"type": "fileLatest", "key": "employees", "fileMaxSize": "1MB",
                 "filePattern": "text/csv,.csv", "resourceValidation": "employee"},
                {"type": "fileLatest", "key": "avatar", "fileMaxSize": "2MB",
                 "filePattern": "image/*"},
                {"type": "file", "key": "archive", "fileMaxSize": "2TB",
                 "filePattern": "application/zip"}
            ]}
        ]
    }))
    .unwrap()
}

fn provider() -> Arc<MockedFormProvider> {
    let provider = MockedFormProvider::new();
    provider.insert(FORM, schema());
    Arc::new(provider)
}

fn state() -> AppState {
    AppState::new(provider()).with_rule_engine(Arc::new(ScriptedEngine))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .header("X-Access-Token", TOKEN)
        .header("X-B3-TraceId", "trace-abc")
        .header("X-B3-SpanId", "span-abc")
        .header("X-Request-Id", "req-abc")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = formval_api::app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

// -- Health / OpenAPI -----------------------------------------------------------

#[tokio::test]
async fn health_probes_respond() {
    for (path, text) in [("/health/liveness", "ok"), ("/health/readiness", "ready")] {
        let request = Request::get(path).body(Body::empty()).unwrap();
        let (status, body) = send(state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(text));
    }
}

#[tokio::test]
async fn openapi_document_is_served() {
    let request = Request::get("/openapi.json").body(Body::empty()).unwrap();
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].as_object().unwrap().len() >= 3);
}

// -- Validate submission --------------------------------------------------------

#[tokio::test]
async fn valid_submission_returns_resolved_data() {
    let request = post(
        "/api/form-submissions/registration/validate",
        json!({"data": {"name": "Ada", "birthday": "1990-12-24"}}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["greeting"], "Hello, Ada");
    assert_eq!(body["data"]["birthday"], "24/12/1990");
}

#[tokio::test]
async fn empty_submission_resolves_to_empty_data() {
    let request = post("/api/form-submissions/registration/validate", json!({"data": null}));
    let (status, body) = send(AppState::new(provider()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": {}}));
}

#[tokio::test]
async fn rule_violations_return_422_with_field_errors() {
    let request = post(
        "/api/form-submissions/registration/validate",
        json!({"data": {"name": ""}}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({
            "traceId": "trace-abc",
            "code": "VALIDATION_ERROR",
            "details": {"errors": [
                {"value": "\"\"", "field": "name", "message": "Name is <required>"}
            ]}
        })
    );
}

#[tokio::test]
async fn engine_failure_is_500_without_internals() {
    let request = post(
        "/api/form-submissions/registration/validate",
        json!({"data": {"name": "boom"}}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Unknown validation error");
    assert!(!body.to_string().contains("engine crashed"));
}

#[tokio::test]
async fn missing_token_is_401() {
    let request = Request::post("/api/form-submissions/registration/validate")
        .header("content-type", "application/json")
        .body(Body::from(json!({"data": {}}).to_string()))
        .unwrap();
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn rejected_token_is_401() {
    let state = AppState::new(Arc::new(RejectingProvider));
    let request = post("/api/form-submissions/registration/validate", json!({"data": {}}));
    let (status, body) = send(state, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Wrong access token!");
    assert_eq!(body["traceId"], "trace-abc");
}

#[tokio::test]
async fn unknown_form_is_404() {
    let request = post("/api/form-submissions/ghost/validate", json!({"data": {}}));
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Form is not found!");
}

#[tokio::test]
async fn malformed_body_is_400() {
    let request = Request::post("/api/form-submissions/registration/validate")
        .header("content-type", "application/json")
        .header("X-Access-Token", TOKEN)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

// -- CSV checksum verification ----------------------------------------------------

#[tokio::test]
async fn csv_files_are_verified_with_process_instance() {
    let data_factory = Arc::new(RecordingDataFactory::default());
    let state = state().with_data_factory(data_factory.clone());
    let request = post(
        "/api/form-submissions/registration/validate",
        json!({
            "processInstanceId": "proc-7",
            "data": {"name": "Ada", "employees": [{"id": "file-1", "checksum": "abc"}]}
        }),
    );
    let (status, _) = send(state, request).await;
    assert_eq!(status, StatusCode::OK);

    let calls = data_factory.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].entity, "employee");
    assert_eq!(calls[0].process_instance_id, "proc-7");
    assert_eq!(calls[0].access_token, TOKEN);
    assert_eq!(calls[0].file.id.as_deref(), Some("file-1"));
    let trace = calls[0].trace.as_ref().unwrap();
    assert_eq!(trace.trace_id, "trace-abc");
    assert_eq!(trace.span_id, "span-abc");
    assert_eq!(trace.request_id, "req-abc");
}

#[tokio::test]
async fn csv_checks_are_skipped_without_process_instance() {
    let data_factory = Arc::new(RecordingDataFactory::default());
    let state = state().with_data_factory(data_factory.clone());
    let request = post(
        "/api/form-submissions/registration/validate",
        json!({"data": {"name": "Ada", "employees": [{"id": "file-1", "checksum": "bad"}]}}),
    );
    let (status, _) = send(state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(data_factory.calls.lock().is_empty());
}

#[tokio::test]
async fn rejected_csv_relays_data_factory_body() {
    let state = state().with_data_factory(Arc::new(RecordingDataFactory::default()));
    let request = post(
        "/api/form-submissions/registration/validate",
        json!({
            "processInstanceId": "proc-7",
            "data": {"name": "Ada", "employees": [{"id": "file-1", "checksum": "bad"}]}
        }),
    );
    let (status, body) = send(state, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"code": "CSV_CHECKSUM_MISMATCH", "message": "Checksum mismatch"}));
}

// -- Field validation ---------------------------------------------------------------

#[tokio::test]
async fn acceptable_file_metadata_is_valid() {
    let request = post(
        "/api/form-submissions/registration/fields/avatar/validate",
        json!({"fileName": "me.png", "contentType": "image/png", "size": 1024}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"isValid": true}));
}

#[tokio::test]
async fn oversized_file_is_422_on_the_field() {
    let request = post(
        "/api/form-submissions/registration/fields/employees/validate",
        json!({"fileName": "staff.csv", "contentType": "text/csv", "size": 5 * 1024 * 1024}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["details"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], "employees");
    assert!(errors[0]["message"].as_str().unwrap().contains("1MB"));
}

#[tokio::test]
async fn fractional_size_is_accepted() {
    let request = post(
        "/api/form-submissions/registration/fields/avatar/validate",
        json!({"fileName": "me.png", "contentType": "image/png", "size": 2048.5}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"isValid": true}));
}

#[tokio::test]
async fn unusable_schema_constraint_is_422_on_the_field() {
    let request = post(
        "/api/form-submissions/registration/fields/archive/validate",
        json!({"fileName": "a.zip", "contentType": "application/zip", "size": 1}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["errors"][0]["field"], "archive");
    assert!(body["details"]["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("(TB)"));
}

#[tokio::test]
async fn unknown_field_is_422() {
    let request = post(
        "/api/form-submissions/registration/fields/nope/validate",
        json!({"fileName": "a.png", "contentType": "image/png", "size": 1}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["details"]["errors"][0]["message"],
        "The field (nope) is not found on the ui form"
    );
}

// -- Field existence ----------------------------------------------------------------

#[tokio::test]
async fn existing_fields_are_reported() {
    let request = post(
        "/api/form-submissions/registration/fields/check",
        json!({"fields": ["name", "avatar"]}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 200, "fields": {"name": true, "avatar": true}}));
}

#[tokio::test]
async fn missing_fields_are_422() {
    let request = post(
        "/api/form-submissions/registration/fields/check",
        json!({"fields": ["name", "ghost"]}),
    );
    let (status, body) = send(state(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["details"]["errors"],
        json!([{"field": "ghost", "message": "Field \"ghost\" does not exist!"}])
    );
}

#[tokio::test]
async fn blank_field_names_are_400() {
    let request = post(
        "/api/form-submissions/registration/fields/check",
        json!({"fields": [" "]}),
    );
    let (status, _) = send(state(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Prefix ---------------------------------------------------------------------------

#[tokio::test]
async fn routes_follow_configured_prefix() {
    let config = AppConfig {
        api_prefix: "forms/v2".into(),
        ..AppConfig::default()
    };
    let state = AppState::with_config(config, provider());

    let request = post(
        "/forms/v2/form-submissions/registration/fields/check",
        json!({"fields": ["name"]}),
    );
    let (status, _) = send(state.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let request = post(
        "/api/form-submissions/registration/fields/check",
        json!({"fields": ["name"]}),
    );
    let (status, _) = send(state, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
