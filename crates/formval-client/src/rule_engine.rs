//! Remote rule engine over HTTP.
//!
//! `POST {base_url}/evaluate` with `{form, submission}`:
//! - 2xx: `{data}` with the resolved submission data;
//! - 400 / 422: `{details: [...]}` with the rule violations;
//! - anything else, or a transport failure, is an engine failure.

use formval_core::{FormSchema, FormSubmission, ValidationErrorDetail};
use formval_validation::{BoxFuture, RuleEngine, RuleEngineError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint_url;

const ENDPOINT: &str = "POST /evaluate";

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    form: &'a FormSchema,
    submission: &'a FormSubmission,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    #[serde(default)]
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct RejectionResponse {
    #[serde(default)]
    details: Vec<ValidationErrorDetail>,
}

/// [`RuleEngine`] backed by a remote evaluation service.
#[derive(Debug, Clone)]
pub struct HttpRuleEngine {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpRuleEngine {
    pub fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    async fn call(
        &self,
        schema: &FormSchema,
        submission: &FormSubmission,
    ) -> Result<Map<String, Value>, RuleEngineError> {
        let url = endpoint_url(&self.base_url, "evaluate");
        let body = EvaluateRequest {
            form: schema,
            submission,
        };

        let resp = crate::retry::retry_send(ENDPOINT, || self.http.post(&url).json(&body).send())
            .await
            .map_err(|e| RuleEngineError::Engine(format!("HTTP error calling {ENDPOINT}: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            let reply: EvaluateResponse = resp.json().await.map_err(|e| {
                RuleEngineError::Engine(format!("failed to deserialize response from {ENDPOINT}: {e}"))
            })?;
            return Ok(reply.data);
        }

        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            let rejection: RejectionResponse = resp.json().await.map_err(|e| {
                RuleEngineError::Engine(format!("failed to deserialize rejection from {ENDPOINT}: {e}"))
            })?;
            return Err(RuleEngineError::Validation(rejection.details));
        }

        let body = resp.text().await.unwrap_or_default();
        Err(RuleEngineError::Engine(format!(
            "{ENDPOINT} returned {}: {body}",
            status.as_u16()
        )))
    }
}

impl RuleEngine for HttpRuleEngine {
    fn evaluate<'a>(
        &'a self,
        schema: &'a FormSchema,
        submission: &'a FormSubmission,
    ) -> BoxFuture<'a, Result<Map<String, Value>, RuleEngineError>> {
        Box::pin(self.call(schema, submission))
    }
}
