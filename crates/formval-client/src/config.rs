//! Collaborator client configuration.
//!
//! Base URLs for the form provider, data factory and rule engine, read once
//! at startup. Only the form provider is mandatory, and only when the
//! mocked provider is not selected.

use std::path::PathBuf;

use url::Url;

/// Configuration for connecting to the collaborator services.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Remote form provider base URL. `None` only when the mocked
    /// provider is in use.
    pub form_provider_url: Option<Url>,
    /// Serve schemas from memory instead of the remote provider.
    pub use_mocked_form_provider: bool,
    /// Directory of `<formKey>.json` files seeding the mocked provider.
    pub mocked_forms_dir: Option<PathBuf>,
    /// Data-factory base URL. `None` disables CSV checksum checks.
    pub data_factory_url: Option<Url>,
    /// Remote rule engine base URL. `None` selects the passthrough engine.
    pub rule_engine_url: Option<Url>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FORM_PROVIDER_BASE_URL` (required unless the mocked provider is used)
    /// - `USE_MOCKED_FORM_PROVIDER` (default: `false`)
    /// - `MOCKED_FORMS_DIR` (optional)
    /// - `DATA_FACTORY_BASE_URL` (optional)
    /// - `RULE_ENGINE_URL` (optional)
    /// - `CLIENT_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_mocked_form_provider = lookup("USE_MOCKED_FORM_PROVIDER")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let form_provider_url = optional_url(&lookup, "FORM_PROVIDER_BASE_URL")?;
        if form_provider_url.is_none() && !use_mocked_form_provider {
            return Err(ConfigError::MissingVar("FORM_PROVIDER_BASE_URL".into()));
        }

        Ok(Self {
            form_provider_url,
            use_mocked_form_provider,
            mocked_forms_dir: lookup("MOCKED_FORMS_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            data_factory_url: optional_url(&lookup, "DATA_FACTORY_BASE_URL")?,
            rule_engine_url: optional_url(&lookup, "RULE_ENGINE_URL")?,
            timeout_secs: lookup("CLIENT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Configuration for tests: mocked provider, no collaborators.
    pub fn mocked() -> Self {
        Self {
            form_provider_url: None,
            use_mocked_form_provider: true,
            mocked_forms_dir: None,
            data_factory_url: None,
            rule_engine_url: None,
            timeout_secs: 5,
        }
    }
}

fn optional_url<F>(lookup: &F, var: &str) -> Result<Option<Url>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => Url::parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn remote_provider_requires_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "FORM_PROVIDER_BASE_URL"));
    }

    #[test]
    fn mocked_provider_needs_no_url() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("USE_MOCKED_FORM_PROVIDER", "true"),
            ("MOCKED_FORMS_DIR", "/srv/forms"),
        ]))
        .unwrap();
        assert!(cfg.use_mocked_form_provider);
        assert_eq!(cfg.mocked_forms_dir, Some(PathBuf::from("/srv/forms")));
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.rule_engine_url.is_none());
    }

    #[test]
    fn parses_all_urls() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("FORM_PROVIDER_BASE_URL", "http://forms.local"),
            ("DATA_FACTORY_BASE_URL", "http://data-factory.local/api"),
            ("RULE_ENGINE_URL", "http://rules.local"),
            ("CLIENT_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();
        assert_eq!(cfg.form_provider_url.unwrap().as_str(), "http://forms.local/");
        assert_eq!(
            cfg.data_factory_url.unwrap().as_str(),
            "http://data-factory.local/api"
        );
        assert_eq!(cfg.timeout_secs, 7);
    }

    #[test]
    fn invalid_url_is_reported() {
        let err = ClientConfig::from_lookup(lookup(&[("FORM_PROVIDER_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(var, _) if var == "FORM_PROVIDER_BASE_URL"));
    }
}
