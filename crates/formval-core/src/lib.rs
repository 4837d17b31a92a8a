//! # formval-core -- Foundational Types for Form Submission Validation
//!
//! This crate defines the types every other crate in the workspace builds
//! on. It has no internal crate dependencies (only `serde`, `serde_json`
//! and `thiserror` from the external ecosystem).
//!
//! ## Design Principles
//!
//! 1. **Component shape is a tagged enum.** A schema node's children are
//!    described by exactly one [`ComponentShape`] variant (plain field,
//!    nested list, columns, table grid). Traversal pattern-matches on the
//!    tag instead of probing for field presence.
//!
//! 2. **Variant suffixes are normalized in one place.** `fileLatest`,
//!    `fileLegacy` and `file` classify identically through
//!    [`normalize_type`] and [`ComponentKind`].
//!
//! 3. **One resolver.** [`find_components`] is the single depth-first search
//!    over the four nesting idioms; every lookup in the workspace goes
//!    through it.
//!
//! 4. **Typed error taxonomy.** [`FormValidationError`] carries the
//!    user-facing messages; callers choose status codes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formval-*` crates.
//! - No `unsafe` code, no `.unwrap()` outside tests.
//! - Schema and submission values are never mutated in place by this crate.

pub mod component;
pub mod error;
pub mod kind;
pub mod resolve;
pub mod submission;

// Re-export primary types at crate root for ergonomic imports.
pub use component::{Column, ComponentShape, FormComponent, FormSchema, Row};
pub use error::FormValidationError;
pub use kind::{
    is_columns_component, is_fieldset_component, is_file_component, is_table_component,
    normalize_type, ComponentKind, VARIANT_SUFFIXES,
};
pub use resolve::{find_component, find_components};
pub use submission::{
    FileData, FileMeta, FormSubmission, ValidationErrorContext, ValidationErrorDetail,
};
