pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::ai_gateway::CompletionBackend;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utils::auth::TokenVerifier;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub verifier: TokenVerifier,
    /// `None` when no gateway credential is configured; generation requests
    /// then fail with a configuration error instead of reaching the network.
    pub backend: Option<Arc<dyn CompletionBackend>>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        // The dashboard lives on another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
