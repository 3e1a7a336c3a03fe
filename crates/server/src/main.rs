use std::sync::Arc;

use db::DBService;
use server::{AppState, app, config::Config};
use services::services::ai_gateway::{AiGatewayClient, CompletionBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utils::auth::TokenVerifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = DBService::new(&config.database_url).await?;

    let backend: Option<Arc<dyn CompletionBackend>> = match &config.gateway.api_key {
        Some(api_key) => {
            let client = AiGatewayClient::new(
                api_key.clone(),
                config.gateway.base_url.clone(),
                config.gateway.model.clone(),
            )?;
            Some(Arc::new(client))
        }
        None => {
            warn!("AI_GATEWAY_API_KEY not set; generation requests will fail");
            None
        }
    };

    let state = AppState {
        db,
        verifier: TokenVerifier::new(&config.jwt_secret),
        backend,
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
