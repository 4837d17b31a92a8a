//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds the collaborators behind trait objects
//! so tests can swap in in-memory implementations.

use std::sync::Arc;

use formval_client::{ClientConfig, ConfigError, CsvChecksumService, SchemaProvider};
use formval_validation::{FormValidationService, RuleEngine};

/// Default request body limit: 10 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Path prefix for the form-submission routes, without slashes.
    pub api_prefix: String,
    /// Maximum accepted request body size in bytes.
    pub request_body_limit: usize,
    /// Collaborator client configuration.
    pub clients: ClientConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            api_prefix: "api".to_string(),
            request_body_limit: DEFAULT_BODY_LIMIT,
            clients: ClientConfig::mocked(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `API_GLOBAL_PREFIX` (default: `api`)
    /// - `REQUEST_BODY_LIMIT` as a size such as `50mb`, `512kb` or a plain
    ///   byte count (default: `10mb`)
    /// - every variable read by [`ClientConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            api_prefix: lookup("API_GLOBAL_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or(defaults.api_prefix),
            request_body_limit: match lookup("REQUEST_BODY_LIMIT").filter(|v| !v.trim().is_empty()) {
                None => defaults.request_body_limit,
                Some(raw) => parse_byte_size(&raw).ok_or_else(|| {
                    ConfigError::InvalidValue("REQUEST_BODY_LIMIT".into(), raw.clone())
                })?,
            },
            clients: ClientConfig::from_lookup(&lookup)?,
        })
    }
}

/// Parse a size of the form `<n>[b|kb|mb|gb]`, case-insensitive, where
/// `<n>` may be fractional. A bare number is a byte count. Units are
/// powers of 1024.
pub fn parse_byte_size(raw: &str) -> Option<usize> {
    let raw = raw.trim().to_ascii_lowercase();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (amount, unit) = raw.split_at(split);
    let amount: f64 = amount.parse().ok()?;
    let multiplier: u64 = match unit.trim() {
        "" | "b" => 1,
        "kb" => 1 << 10,
        "mb" => 1 << 20,
        "gb" => 1 << 30,
        _ => return None,
    };
    let bytes = (amount * multiplier as f64).floor();
    (bytes.is_finite() && bytes <= usize::MAX as f64).then_some(bytes as usize)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn SchemaProvider>,
    pub validation: FormValidationService,
    /// `None` disables CSV checksum verification.
    pub data_factory: Option<Arc<dyn CsvChecksumService>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("data_factory", &self.data_factory.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with the given provider, the passthrough rule engine and no
    /// data factory.
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self::with_config(AppConfig::default(), provider)
    }

    pub fn with_config(config: AppConfig, provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            validation: FormValidationService::default(),
            data_factory: None,
        }
    }

    pub fn with_rule_engine(mut self, engine: Arc<dyn RuleEngine>) -> Self {
        self.validation = FormValidationService::new(engine);
        self
    }

    pub fn with_data_factory(mut self, data_factory: Arc<dyn CsvChecksumService>) -> Self {
        self.data_factory = Some(data_factory);
        self
    }
}
