//! Typed process configuration, read from the environment once at startup.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Credential for the AI gateway; absent means generation is disabled.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:corrupt-ware.db".to_string());
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let gateway = GatewayConfig {
            api_key: std::env::var("AI_GATEWAY_API_KEY").ok(),
            base_url: std::env::var("AI_GATEWAY_BASE_URL").ok(),
            model: std::env::var("AI_GATEWAY_MODEL").ok(),
        };

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            gateway,
        })
    }
}
