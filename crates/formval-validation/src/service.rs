//! # Validation Service
//!
//! [`FormValidationService`] is the entry point request handlers call. It
//! clones its inputs, normalizes schema and submission, and hands both to
//! the configured [`RuleEngine`].

use std::sync::Arc;

use formval_core::{FileMeta, FormComponent, FormSchema, FormSubmission, FormValidationError};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::convert::convert_submission;
use crate::engine::{decode_details, PassthroughRuleEngine, RuleEngine, RuleEngineError};
use crate::existence::check_fields_existence;
use crate::file::validate_file_meta;
use crate::normalize::{normalize_schema, normalize_submission};

/// Errors returned by [`FormValidationService::validate`].
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The submission failed validation; user-facing.
    #[error(transparent)]
    Validation(#[from] FormValidationError),

    /// The rule engine could not produce a verdict.
    #[error("rule engine unavailable: {0}")]
    Engine(String),
}

/// Validates submissions against form schemas.
#[derive(Clone)]
pub struct FormValidationService {
    engine: Arc<dyn RuleEngine>,
}

impl std::fmt::Debug for FormValidationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValidationService").finish_non_exhaustive()
    }
}

impl Default for FormValidationService {
    fn default() -> Self {
        Self::new(Arc::new(PassthroughRuleEngine))
    }
}

impl FormValidationService {
    pub fn new(engine: Arc<dyn RuleEngine>) -> Self {
        Self { engine }
    }

    /// Normalize and evaluate a submission, returning the resolved data.
    pub async fn validate(
        &self,
        schema: &FormSchema,
        submission: &FormSubmission,
    ) -> Result<Map<String, Value>, ServiceError> {
        let schema = normalize_schema(schema);
        let submission = normalize_submission(&schema.components, submission);

        tracing::debug!(
            fields = submission.data.len(),
            components = schema.components.len(),
            "evaluating submission"
        );

        match self.engine.evaluate(&schema, &submission).await {
            Ok(_) if submission.data.is_empty() => Ok(Map::new()),
            Ok(data) => Ok(data),
            Err(RuleEngineError::Validation(details)) => {
                let details = decode_details(details);
                tracing::debug!(errors = details.len(), "submission rejected by rule engine");
                Err(FormValidationError::ValidationFailed(details).into())
            }
            Err(RuleEngineError::Engine(reason)) => {
                tracing::error!(%reason, "rule engine failed");
                Err(ServiceError::Engine(reason))
            }
        }
    }

    /// Check declared file metadata against the field's file component.
    pub fn validate_file_meta(
        &self,
        schema: &FormSchema,
        key: &str,
        meta: &FileMeta,
    ) -> Result<(), FormValidationError> {
        validate_file_meta(&schema.components, key, meta)
    }

    /// Report which of `fields` exist anywhere in the schema.
    pub fn check_fields_existence<S: AsRef<str>>(
        &self,
        schema: &FormSchema,
        fields: &[S],
    ) -> IndexMap<String, bool> {
        check_fields_existence(&schema.components, fields)
    }

    /// Apply `converter` to a copy of the submission's data.
    pub fn convert_submission<F>(
        &self,
        schema: &FormSchema,
        submission: &FormSubmission,
        converter: &F,
    ) -> FormSubmission
    where
        F: Fn(&Value, &FormComponent) -> Value,
    {
        FormSubmission {
            data: convert_submission(&schema.components, &submission.data, converter),
            extra: submission.extra.clone(),
        }
    }
}
