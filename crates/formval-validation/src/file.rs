//! # File Constraint Validation
//!
//! Checks client-declared [`FileMeta`] against the owning file component
//! before any upload happens. Size is checked before type; the first
//! failure is returned.

use std::fmt;
use std::str::FromStr;

use formval_core::{find_component, FileMeta, FormComponent, FormValidationError};

use crate::mime::{matches_file_pattern, supported_mime_types};

/// Unit of a `fileMaxSize` definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    /// Mebibytes (1024 * 1024 bytes).
    Mb,
}

impl SizeUnit {
    /// Bytes per unit.
    pub fn bytes(self) -> u64 {
        match self {
            Self::Mb => 1024 * 1024,
        }
    }
}

impl FromStr for SizeUnit {
    type Err = FormValidationError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "MB" => Ok(Self::Mb),
            other => Err(FormValidationError::UnsupportedSizeDefinition(Some(other.to_string()))),
        }
    }
}

/// A parsed `fileMaxSize` such as `"50MB"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBudget {
    pub amount: u64,
    pub unit: SizeUnit,
    /// The definition as written in the schema, used in error messages.
    pub definition: String,
}

impl SizeBudget {
    /// Parse `<integer><unit>`. The unit is whatever remains after removing
    /// the digits; anything other than a supported unit is rejected.
    pub fn parse(definition: &str) -> Result<Self, FormValidationError> {
        let unit_text: String = definition.chars().filter(|c| !c.is_ascii_digit()).collect();
        let unit = unit_text.parse::<SizeUnit>()?;
        let digits: String = definition.chars().filter(char::is_ascii_digit).collect();
        let amount = digits
            .parse::<u64>()
            .map_err(|_| FormValidationError::UnsupportedSizeDefinition(Some(definition.to_string())))?;
        Ok(Self {
            amount,
            unit,
            definition: definition.to_string(),
        })
    }

    /// Whether `size` bytes is over budget. Fractional units count, so a
    /// file one byte over `10MB` is rejected.
    pub fn is_exceeded_by(&self, size: f64) -> bool {
        size / self.unit.bytes() as f64 > self.amount as f64
    }
}

impl fmt::Display for SizeBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition)
    }
}

/// Validate declared file metadata against the component bound to `key`.
pub fn validate_file_meta(
    components: &[FormComponent],
    key: &str,
    meta: &FileMeta,
) -> Result<(), FormValidationError> {
    let component = find_component(components, key)
        .ok_or_else(|| FormValidationError::MissingFormComponent(key.to_string()))?;

    check_size(component, meta.size)?;
    check_type(component, meta)
}

fn check_size(component: &FormComponent, size: f64) -> Result<(), FormValidationError> {
    let definition = component
        .file_max_size
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or(FormValidationError::UnsupportedSizeDefinition(None))?;
    let budget = SizeBudget::parse(definition)?;
    if budget.is_exceeded_by(size) {
        return Err(FormValidationError::FileMaxSizeExceeded(budget.to_string()));
    }
    Ok(())
}

fn check_type(component: &FormComponent, meta: &FileMeta) -> Result<(), FormValidationError> {
    let entries = supported_mime_types(component.file_pattern.as_deref().unwrap_or_default());
    if matches_file_pattern(&entries, &meta.content_type, &meta.file_name) {
        Ok(())
    } else {
        Err(FormValidationError::UnsupportedFileType(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(max: Option<&str>, pattern: Option<&str>) -> Vec<FormComponent> {
        let mut file = FormComponent::field("fileLatest", "doc");
        file.file_max_size = max.map(str::to_string);
        file.file_pattern = pattern.map(str::to_string);
        vec![FormComponent::nested("fieldset", None, vec![file])]
    }

    fn meta(content_type: &str, size: u64) -> FileMeta {
        FileMeta {
            file_name: "upload.bin".into(),
            content_type: content_type.into(),
            size: size as f64,
        }
    }

    const PATTERN: &str = "application/pdf,image/png,image/jpeg";

    #[test]
    fn small_png_passes() {
        let schema = upload(Some("50MB"), Some(PATTERN));
        assert!(validate_file_meta(&schema, "doc", &meta("image/png", 20)).is_ok());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let schema = upload(Some("50MB"), Some(PATTERN));
        let err = validate_file_meta(&schema, "doc", &meta("text/plain", 20)).unwrap_err();
        assert_eq!(
            err,
            FormValidationError::UnsupportedFileType(vec![
                "application/pdf".into(),
                "image/png".into(),
                "image/jpeg".into(),
            ])
        );
    }

    #[test]
    fn oversized_file_is_rejected_before_type() {
        let schema = upload(Some("50MB"), Some(PATTERN));
        let err = validate_file_meta(&schema, "doc", &meta("text/plain", 100 * 1024 * 1024)).unwrap_err();
        assert_eq!(err, FormValidationError::FileMaxSizeExceeded("50MB".into()));
    }

    #[test]
    fn budget_boundary() {
        let budget = SizeBudget::parse("10MB").unwrap();
        assert!(!budget.is_exceeded_by(10.0 * 1024.0 * 1024.0));
        assert!(budget.is_exceeded_by(10.0 * 1024.0 * 1024.0 + 1.0));
    }

    #[test]
    fn fractional_sizes_are_compared_exactly() {
        let budget = SizeBudget::parse("1MB").unwrap();
        assert!(!budget.is_exceeded_by(1024.0 * 1024.0 - 0.5));
        assert!(budget.is_exceeded_by(1024.0 * 1024.0 + 0.5));

        let schema = upload(Some("1MB"), Some(PATTERN));
        let fractional = FileMeta {
            file_name: "scan.png".into(),
            content_type: "image/png".into(),
            size: 2048.75,
        };
        assert!(validate_file_meta(&schema, "doc", &fractional).is_ok());
    }

    #[test]
    fn missing_component() {
        let err = validate_file_meta(&[], "doc", &meta("image/png", 1)).unwrap_err();
        assert_eq!(err, FormValidationError::MissingFormComponent("doc".into()));
    }

    #[test]
    fn size_definition_errors() {
        let err = validate_file_meta(&upload(None, Some(PATTERN)), "doc", &meta("image/png", 1)).unwrap_err();
        assert_eq!(err, FormValidationError::UnsupportedSizeDefinition(None));

        let err = validate_file_meta(&upload(Some("2TB"), Some(PATTERN)), "doc", &meta("image/png", 1)).unwrap_err();
        assert_eq!(err, FormValidationError::UnsupportedSizeDefinition(Some("TB".into())));

        assert!(SizeBudget::parse("MB").is_err());
    }

    #[test]
    fn missing_pattern_accepts_nothing() {
        let err = validate_file_meta(&upload(Some("1MB"), None), "doc", &meta("image/png", 1)).unwrap_err();
        assert_eq!(err, FormValidationError::UnsupportedFileType(vec![]));
    }
}
