//! The token-metered code generation endpoint.

use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use serde::{Deserialize, Serialize};
use services::services::{
    ai_gateway::AiGatewayError,
    generation::{GenerateRequest, GenerationError, GenerationService, ProjectWrite},
};
use tracing::warn;
use ts_rs::TS;
use uuid::Uuid;

use crate::{AppState, error::ApiError, routes::authenticate};

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeRequest {
    /// Missing and empty prompts get the same rejection.
    #[serde(default)]
    pub prompt: String,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    pub code: String,
    pub tokens_used: i64,
    pub remaining_tokens: i64,
}

/// POST /api/generate
///
/// Validates the prompt before touching the credential, the database, or the
/// network, then runs the authenticate → gate → generate → debit pipeline.
pub async fn generate_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<GenerateCodeRequest>,
) -> Result<ResponseJson<GenerateCodeResponse>, ApiError> {
    if payload.prompt.trim().is_empty() {
        return Err(GenerationError::EmptyPrompt.into());
    }

    let user = authenticate(&state, &headers)?;

    let backend = state
        .backend
        .clone()
        .ok_or(GenerationError::Gateway(AiGatewayError::MissingApiKey))?;

    let service = GenerationService::new(state.db.pool.clone(), backend);
    let outcome = service
        .generate(
            user.id,
            GenerateRequest {
                prompt: payload.prompt,
                project_id: payload.project_id,
            },
        )
        .await?;

    if outcome.project == ProjectWrite::Failed {
        // Best-effort write: the generation still counts, but make it visible.
        warn!(user_id = %user.id, "project status update did not apply");
    }

    Ok(ResponseJson(GenerateCodeResponse {
        code: outcome.code,
        tokens_used: outcome.tokens_used,
        remaining_tokens: outcome.remaining_tokens,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate_code))
}
