//! # Form Schema Provider
//!
//! Loads form schemas by key on behalf of the caller. The caller's access
//! token is forwarded verbatim; the provider, not this service, decides
//! whether it is valid.
//!
//! | Method | Path                  | Outcome                                  |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/api/forms/{formKey}` | 200 schema, 401 invalid token, 404 missing |

use std::collections::HashMap;
use std::path::Path;

use formval_core::FormSchema;
use formval_validation::BoxFuture;
use parking_lot::RwLock;

use crate::error::{ClientError, ProviderError};
use crate::{api_error, endpoint_url, ACCESS_TOKEN_HEADER};

/// Source of form schemas.
pub trait SchemaProvider: Send + Sync {
    /// Fetch the schema registered under `form_key`.
    fn get_form<'a>(
        &'a self,
        token: &'a str,
        form_key: &'a str,
    ) -> BoxFuture<'a, Result<FormSchema, ProviderError>>;
}

// -- Remote provider ----------------------------------------------------------

/// Client for the remote form provider.
#[derive(Debug, Clone)]
pub struct HttpFormProvider {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpFormProvider {
    pub fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Calls `GET {base_url}/api/forms/{form_key}`.
    pub async fn fetch(&self, token: &str, form_key: &str) -> Result<FormSchema, ProviderError> {
        let endpoint = format!("GET /api/forms/{form_key}");
        let url = endpoint_url(&self.base_url, &format!("api/forms/{form_key}"));

        let resp = crate::retry::retry_send(&endpoint, || {
            self.http
                .get(&url)
                .header(ACCESS_TOKEN_HEADER, token)
                .send()
        })
        .await
        .map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::InvalidToken);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::FormNotFound(form_key.to_string()));
        }
        if !resp.status().is_success() {
            return Err(api_error(&endpoint, resp).await.into());
        }

        resp.json().await.map_err(|e| {
            ClientError::Deserialization {
                endpoint,
                source: e,
            }
            .into()
        })
    }
}

impl SchemaProvider for HttpFormProvider {
    fn get_form<'a>(
        &'a self,
        token: &'a str,
        form_key: &'a str,
    ) -> BoxFuture<'a, Result<FormSchema, ProviderError>> {
        Box::pin(self.fetch(token, form_key))
    }
}

// -- In-memory provider -------------------------------------------------------

/// Serves schemas from memory. Any token is accepted.
#[derive(Debug, Default)]
pub struct MockedFormProvider {
    forms: RwLock<HashMap<String, FormSchema>>,
}

impl MockedFormProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir`, keyed by file stem.
    pub fn load_dir(dir: &Path) -> Result<Self, ProviderError> {
        let storage_error = |path: &Path, reason: String| ProviderError::Storage {
            path: path.display().to_string(),
            reason,
        };

        let provider = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| storage_error(dir, e.to_string()))?;
        for entry in entries {
            let path = entry.map_err(|e| storage_error(dir, e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(form_key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path).map_err(|e| storage_error(&path, e.to_string()))?;
            let schema: FormSchema =
                serde_json::from_str(&raw).map_err(|e| storage_error(&path, e.to_string()))?;
            provider.insert(form_key, schema);
        }

        tracing::info!(dir = %dir.display(), forms = provider.len(), "loaded mocked form schemas");
        Ok(provider)
    }

    /// Register or replace a schema.
    pub fn insert(&self, form_key: impl Into<String>, schema: FormSchema) {
        self.forms.write().insert(form_key.into(), schema);
    }

    pub fn len(&self) -> usize {
        self.forms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.read().is_empty()
    }

    /// Registered form keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.forms.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl SchemaProvider for MockedFormProvider {
    fn get_form<'a>(
        &'a self,
        _token: &'a str,
        form_key: &'a str,
    ) -> BoxFuture<'a, Result<FormSchema, ProviderError>> {
        let found = self.forms.read().get(form_key).cloned();
        Box::pin(async move { found.ok_or_else(|| ProviderError::FormNotFound(form_key.to_string())) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formval_core::FormComponent;

    #[tokio::test]
    async fn mocked_provider_serves_inserted_forms() {
        let provider = MockedFormProvider::new();
        provider.insert(
            "profile",
            FormSchema::new(vec![FormComponent::field("textfield", "name")]),
        );

        let schema = provider.get_form("any-token", "profile").await.unwrap();
        assert_eq!(schema.components.len(), 1);

        let err = provider.get_form("any-token", "ghost").await.unwrap_err();
        assert!(matches!(err, ProviderError::FormNotFound(key) if key == "ghost"));
    }

    #[test]
    fn load_dir_reads_json_files_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("registration.json"),
            r#"{"title": "Registration", "components": [{"type": "textfield", "key": "name"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let provider = MockedFormProvider::load_dir(dir.path()).unwrap();
        assert_eq!(provider.keys(), vec!["registration"]);
    }

    #[test]
    fn load_dir_reports_malformed_schema() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let err = MockedFormProvider::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ProviderError::Storage { path, .. } if path.ends_with("broken.json")));
    }
}
