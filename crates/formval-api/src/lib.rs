//! # formval-api -- Form Submission Validation Service
//!
//! Axum service that checks form submissions against the UI form schema
//! they were filled from. Schemas are loaded per request from the form
//! provider using the caller's access token.
//!
//! ## API Surface
//!
//! | Route                                                        | Operation                 |
//! |--------------------------------------------------------------|---------------------------|
//! | `POST /{prefix}/form-submissions/{formKey}/validate`          | Normalize + rule-check a submission |
//! | `POST /{prefix}/form-submissions/{formKey}/fields/{fieldKey}/validate` | Pre-upload file metadata check |
//! | `POST /{prefix}/form-submissions/{formKey}/fields/check`      | Field existence check     |
//! | `GET /openapi.json`                                           | OpenAPI document          |
//! | `GET /health/liveness`, `GET /health/readiness`               | Health probes             |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → DefaultBodyLimit → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; delegates to `formval-validation`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod trace;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let prefix = state.config.api_prefix.clone();
    let body_limit = state.config.request_body_limit;

    let submissions = routes::form_submissions::router();
    let api = if prefix.is_empty() {
        submissions
    } else {
        Router::new().nest(&format!("/{prefix}"), submissions)
    };

    let api = api
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the state has been built.
async fn readiness() -> &'static str {
    "ready"
}
