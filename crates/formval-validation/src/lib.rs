//! # formval-validation -- Submission Normalization and Validation Pipeline
//!
//! Everything that runs between "a schema and a submission arrived" and
//! "the rule engine has an opinion":
//!
//! - [`normalize`]: variant-type rewriting of the schema and per-entry
//!   coercion of submitted values (day formats, file references).
//! - [`convert`]: a generic value transform keyed by component definition,
//!   with a fixed precedence order across nesting idioms.
//! - [`file`] and [`mime`]: file size budget and content-type checks.
//! - [`existence`]: batch "does this field exist" lookup.
//! - [`engine`]: the [`RuleEngine`] boundary and its passthrough default.
//! - [`service`]: [`FormValidationService`], the pipeline tying it together.
//!
//! All operations except the rule-engine call are synchronous and pure;
//! inputs are cloned at the entry points and never mutated.

pub mod convert;
pub mod engine;
pub mod existence;
pub mod file;
pub mod mime;
pub mod normalize;
pub mod service;

pub use convert::convert_submission;
pub use engine::{BoxFuture, PassthroughRuleEngine, RuleEngine, RuleEngineError};
pub use existence::check_fields_existence;
pub use file::{validate_file_meta, SizeBudget, SizeUnit};
pub use mime::{matches_file_pattern, supported_mime_types};
pub use normalize::{normalize_components, normalize_schema, normalize_submission};
pub use service::{FormValidationService, ServiceError};
