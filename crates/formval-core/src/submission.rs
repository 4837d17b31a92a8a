//! # Submission Types
//!
//! Shapes of the data a client submits and of the error details the rule
//! engine reports back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An end-user submission.
///
/// Only `data` is interpreted; everything else (`metadata`, `state`, ...)
/// is carried through opaquely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Field values keyed by component key. Missing or `null` reads as `{}`.
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub data: Map<String, Value>,
    /// Opaque passthrough fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormSubmission {
    /// Create a submission carrying only `data`.
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            data,
            extra: Map::new(),
        }
    }
}

/// A stored file reference as submitted for a file-type field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileData {
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl FileData {
    /// Read the file reference from a submitted value, which may be a bare
    /// object or a list whose first element is the object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let first = match value {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let object = first.as_object()?;
        let text = |name: &str| object.get(name).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            checksum: text("checksum"),
            id: text("id"),
        })
    }

    /// Both `checksum` and `id` are present and non-empty.
    pub fn is_complete(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.checksum) && filled(&self.id)
    }
}

/// Client-declared metadata of a file about to be uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub file_name: String,
    pub content_type: String,
    /// Size in bytes. Any JSON number is accepted, fractional included.
    pub size: f64,
}

/// One failure reported by the rule engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Path to the failing value; numeric segments (list indices) are
    /// rendered as strings.
    #[serde(default, deserialize_with = "path_segments")]
    pub path: Vec<String>,
    #[serde(default)]
    pub context: ValidationErrorContext,
}

/// Where and why a rule-engine check failed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationErrorContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub setting: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Value,
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn path_segments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let segments = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}
