use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::profile::{PlanType, Profile};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{AppState, error::ApiError, routes::authenticate};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub display_name: Option<String>,
    pub plan: PlanType,
    pub selected_character: Option<String>,
    pub token_balance: i64,
    pub token_consumed: i64,
    pub is_admin: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            email: profile.email,
            display_name: profile.display_name,
            plan: profile.plan,
            selected_character: profile.selected_character,
            token_balance: profile.token_balance,
            token_consumed: profile.token_consumed,
            is_admin: profile.is_admin,
        }
    }
}

/// GET /api/profile — the caller's account, plan and token ledger
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<ProfileResponse>, ApiError> {
    let user = authenticate(&state, &headers)?;

    let profile = Profile::find_by_id(&state.db.pool, user.id)
        .await?
        .ok_or(ApiError::ProfileNotFound)?;

    Ok(ResponseJson(profile.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}
