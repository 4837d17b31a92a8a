//! # Rule Engine Boundary
//!
//! The rule engine evaluates derived values, conditional visibility and
//! per-field validators. It is an external collaborator: this crate only
//! prepares its input and relays its verdict.
//!
//! Implementations live elsewhere (`formval-client` ships an HTTP one);
//! [`PassthroughRuleEngine`] accepts everything and is used when no engine
//! is configured.

use std::future::Future;
use std::pin::Pin;

use formval_core::{FormSchema, FormSubmission, ValidationErrorDetail};
use serde_json::{Map, Value};
use thiserror::Error;

/// Boxed `Send` future returned by the async collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure reported by a [`RuleEngine`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleEngineError {
    /// The submission violates one or more rules.
    #[error("submission rejected with {} error(s)", .0.len())]
    Validation(Vec<ValidationErrorDetail>),

    /// The engine itself failed (unreachable, malformed reply, ...).
    #[error("rule engine failure: {0}")]
    Engine(String),
}

/// Evaluates a submission against a normalized schema.
pub trait RuleEngine: Send + Sync {
    /// Return the resolved submission data, or the rule violations.
    fn evaluate<'a>(
        &'a self,
        schema: &'a FormSchema,
        submission: &'a FormSubmission,
    ) -> BoxFuture<'a, Result<Map<String, Value>, RuleEngineError>>;
}

/// Accepts every submission and returns its data unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRuleEngine;

impl RuleEngine for PassthroughRuleEngine {
    fn evaluate<'a>(
        &'a self,
        _schema: &'a FormSchema,
        submission: &'a FormSubmission,
    ) -> BoxFuture<'a, Result<Map<String, Value>, RuleEngineError>> {
        let data = submission.data.clone();
        Box::pin(async move { Ok(data) })
    }
}

/// Decode HTML entities (`&lt;`, `&#39;`, ...) in every detail message.
pub fn decode_details(details: Vec<ValidationErrorDetail>) -> Vec<ValidationErrorDetail> {
    details
        .into_iter()
        .map(|mut detail| {
            detail.message = html_escape::decode_html_entities(&detail.message).into_owned();
            detail
        })
        .collect()
}
