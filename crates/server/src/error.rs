//! Maps every domain error onto the wire contract.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::services::{
    ai_gateway::AiGatewayError,
    generation::GenerationError,
    premium_keys::PremiumKeyError,
};
use thiserror::Error;
use tracing::error;
use utils::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    PremiumKey(#[from] PremiumKeyError),
    #[error("profile not found")]
    ProfileNotFound,
    #[error("admin access required")]
    Forbidden,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Auth(AuthError::MissingHeader) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "No authorization header" }),
            ),
            ApiError::Auth(AuthError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid token" }))
            }

            ApiError::Generation(GenerationError::EmptyPrompt) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Prompt is required" }),
            ),
            ApiError::ProfileNotFound
            | ApiError::Generation(GenerationError::ProfileNotFound)
            | ApiError::PremiumKey(PremiumKeyError::ProfileNotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Profile not found" }),
            ),
            ApiError::Generation(GenerationError::InsufficientTokens {
                required,
                available,
            }) => (
                StatusCode::PAYMENT_REQUIRED,
                json!({
                    "error": "Insufficient tokens",
                    "required": required,
                    "available": available,
                }),
            ),
            ApiError::Generation(GenerationError::DebitConflict { required, available }) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Concurrent debit conflict",
                    "required": required,
                    "available": available,
                }),
            ),
            ApiError::Generation(GenerationError::Gateway(gateway)) => {
                return gateway_error_response(gateway);
            }
            ApiError::Generation(GenerationError::Database(e))
            | ApiError::PremiumKey(PremiumKeyError::Database(e)) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }

            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Admin access required" }),
            ),
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn gateway_error_response(gateway: &AiGatewayError) -> Response {
    let (status, body) = match gateway {
        AiGatewayError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": "Rate limit exceeded. Please try again later." }),
        ),
        AiGatewayError::PaymentRequired => (
            StatusCode::PAYMENT_REQUIRED,
            json!({ "error": "Payment required. Please add credits to the AI gateway workspace." }),
        ),
        AiGatewayError::MissingApiKey => {
            error!("generation requested but no gateway api key is configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "AI gateway API key not configured" }),
            )
        }
        AiGatewayError::Http { status, body } => {
            error!(status, body = %body, "gateway request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "AI request failed", "details": body }),
            )
        }
        other => {
            error!(error = %other, "gateway request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "AI request failed", "details": other.to_string() }),
            )
        }
    };

    (status, Json(body)).into_response()
}
