//! Premium key redemption and admin minting.

use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::{
    premium_key::PremiumKey,
    profile::{PlanType, Profile},
};
use serde::{Deserialize, Serialize};
use services::services::premium_keys::{PremiumKeyService, RedemptionResult};
use ts_rs::TS;

use crate::{AppState, error::ApiError, routes::authenticate};

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RedeemKeyRequest {
    pub key_code: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct MintKeyRequest {
    pub plan: PlanType,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MintKeyResponse {
    pub key_code: String,
    pub plan: PlanType,
}

impl From<PremiumKey> for MintKeyResponse {
    fn from(key: PremiumKey) -> Self {
        Self {
            key_code: key.key_code,
            plan: key.plan,
        }
    }
}

/// POST /api/keys/redeem — RPC semantics: an invalid key is a 200 with
/// `success = false`, not an error status.
pub async fn redeem_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<RedeemKeyRequest>,
) -> Result<ResponseJson<RedemptionResult>, ApiError> {
    let user = authenticate(&state, &headers)?;
    let result = PremiumKeyService::redeem(&state.db.pool, user.id, &payload.key_code).await?;
    Ok(ResponseJson(result))
}

/// POST /api/admin/keys — mint a key for a plan; admins only
pub async fn mint_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<MintKeyRequest>,
) -> Result<ResponseJson<MintKeyResponse>, ApiError> {
    let user = authenticate(&state, &headers)?;

    let profile = Profile::find_by_id(&state.db.pool, user.id)
        .await?
        .ok_or(ApiError::Forbidden)?;
    if !profile.is_admin {
        return Err(ApiError::Forbidden);
    }

    let key = PremiumKeyService::mint(&state.db.pool, payload.plan, user.id).await?;
    Ok(ResponseJson(key.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/keys/redeem", post(redeem_key))
        .route("/admin/keys", post(mint_key))
}
