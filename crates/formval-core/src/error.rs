//! # Error Taxonomy
//!
//! User-facing failures of the validation core. The `Display` text of each
//! variant is the message returned to API clients, so it is kept stable.
//! Status-code mapping belongs to the caller (see `formval-api`).

use thiserror::Error;

use crate::submission::ValidationErrorDetail;

/// Size units accepted in a component's `fileMaxSize`.
pub const SUPPORTED_SIZE_UNITS: &[&str] = &["MB"];

/// Errors raised while validating a submission against a form schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormValidationError {
    /// No component in the schema binds the requested key.
    #[error("The field ({0}) is not found on the ui form")]
    MissingFormComponent(String),

    /// The component's `fileMaxSize` is absent or uses an unsupported unit.
    /// `None` means the definition was missing altogether.
    #[error("{}", size_definition_message(.0.as_deref()))]
    UnsupportedSizeDefinition(Option<String>),

    /// The declared file size is over the component's budget.
    #[error("The size of the downloaded file exceeds {0}")]
    FileMaxSizeExceeded(String),

    /// The declared content type matches none of the accepted entries.
    #[error(
        "The type of the downloaded file is not supported. Supported types are: {}.",
        .0.join("; ")
    )]
    UnsupportedFileType(Vec<String>),

    /// The rule engine rejected the submission.
    #[error("form validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationErrorDetail>),
}

impl FormValidationError {
    /// Whether the failure was caused by the submitted input rather than by
    /// the schema author.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::UnsupportedSizeDefinition(_))
    }
}

fn size_definition_message(unit: Option<&str>) -> String {
    match unit {
        None => "Missing file max size!".to_string(),
        Some(unit) => format!(
            "The file size definition specified in the ui form is not supported ({unit}). \
             Supported file size definitions: [{}].",
            SUPPORTED_SIZE_UNITS.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_component_message() {
        let err = FormValidationError::MissingFormComponent("avatar".into());
        assert_eq!(err.to_string(), "The field (avatar) is not found on the ui form");
    }

    #[test]
    fn size_definition_messages() {
        assert_eq!(
            FormValidationError::UnsupportedSizeDefinition(Some("TB".into())).to_string(),
            "The file size definition specified in the ui form is not supported (TB). \
             Supported file size definitions: [MB]."
        );
        assert_eq!(
            FormValidationError::UnsupportedSizeDefinition(None).to_string(),
            "Missing file max size!"
        );
    }

    #[test]
    fn file_type_message_joins_entries() {
        let err = FormValidationError::UnsupportedFileType(vec![
            "application/pdf".into(),
            "image/png".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "The type of the downloaded file is not supported. \
             Supported types are: application/pdf; image/png."
        );
    }

    #[test]
    fn size_exceeded_message() {
        let err = FormValidationError::FileMaxSizeExceeded("10MB".into());
        assert_eq!(err.to_string(), "The size of the downloaded file exceeds 10MB");
        assert!(err.is_client_error());
        assert!(!FormValidationError::UnsupportedSizeDefinition(None).is_client_error());
    }
}
