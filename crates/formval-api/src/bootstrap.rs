//! # Bootstrap
//!
//! Wires the collaborators named by [`AppConfig`] into an [`AppState`]:
//!
//! 1. **Form provider**: in-memory (optionally seeded from a directory) or
//!    the remote provider.
//! 2. **Rule engine**: remote when `RULE_ENGINE_URL` is set, passthrough
//!    otherwise.
//! 3. **Data factory**: enabled only when `DATA_FACTORY_BASE_URL` is set.

use std::sync::Arc;

use formval_client::{
    build_http_client, ClientError, ConfigError, DataFactoryClient, HttpFormProvider,
    HttpRuleEngine, MockedFormProvider, ProviderError, SchemaProvider,
};

use crate::state::{AppConfig, AppState};

/// Errors during startup wiring.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("mocked form storage error: {0}")]
    MockedForms(#[from] ProviderError),
}

/// Build the application state from configuration.
pub fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let clients = &config.clients;
    let http = build_http_client(clients.timeout_secs)?;

    let provider: Arc<dyn SchemaProvider> = if clients.use_mocked_form_provider {
        let mocked = match &clients.mocked_forms_dir {
            Some(dir) => MockedFormProvider::load_dir(dir)?,
            None => MockedFormProvider::new(),
        };
        tracing::warn!(forms = mocked.len(), "using mocked form provider");
        Arc::new(mocked)
    } else {
        let base_url = clients
            .form_provider_url
            .clone()
            .ok_or_else(|| ConfigError::MissingVar("FORM_PROVIDER_BASE_URL".into()))?;
        tracing::info!(%base_url, "form provider configured");
        Arc::new(HttpFormProvider::new(http.clone(), base_url))
    };

    let rule_engine = clients.rule_engine_url.clone();
    let data_factory = clients.data_factory_url.clone();

    let mut state = AppState::with_config(config, provider);

    match rule_engine {
        Some(base_url) => {
            tracing::info!(%base_url, "rule engine configured");
            state = state.with_rule_engine(Arc::new(HttpRuleEngine::new(http.clone(), base_url)));
        }
        None => tracing::warn!(
            "RULE_ENGINE_URL not set: submissions are normalized but not rule-checked"
        ),
    }

    match data_factory {
        Some(base_url) => {
            tracing::info!(%base_url, "data factory configured");
            state = state.with_data_factory(Arc::new(DataFactoryClient::new(http, base_url)));
        }
        None => tracing::warn!("DATA_FACTORY_BASE_URL not set: CSV checksum checks disabled"),
    }

    Ok(state)
}
