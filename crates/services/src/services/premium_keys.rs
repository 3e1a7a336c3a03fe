//! Premium key minting and redemption.

use db::models::{
    premium_key::PremiumKey,
    profile::{PlanType, Profile},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PremiumKeyError {
    #[error("profile not found")]
    ProfileNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// RPC-style redemption result: invalid keys are a `success = false` answer,
/// not an error.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RedemptionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub plan: Option<PlanType>,
}

pub struct PremiumKeyService;

impl PremiumKeyService {
    /// Redeem a key for the calling user. The whole flow runs in one
    /// transaction so a key can never upgrade two accounts.
    pub async fn redeem(
        pool: &SqlitePool,
        user_id: Uuid,
        key_code: &str,
    ) -> Result<RedemptionResult, PremiumKeyError> {
        let mut tx = pool.begin().await?;

        let Some(key) = PremiumKey::find_unused_by_code(&mut *tx, key_code).await? else {
            return Ok(RedemptionResult {
                success: false,
                message: "Invalid or already used key".to_string(),
                plan: None,
            });
        };

        let consumed = PremiumKey::mark_used(&mut *tx, key.id, user_id).await?;
        if consumed == 0 {
            // Lost the race inside the same transaction scope
            return Ok(RedemptionResult {
                success: false,
                message: "Invalid or already used key".to_string(),
                plan: None,
            });
        }

        let updated = Profile::apply_plan(&mut *tx, user_id, key.plan).await?;
        if updated == 0 {
            return Err(PremiumKeyError::ProfileNotFound);
        }

        tx.commit().await?;

        info!(user_id = %user_id, plan = %key.plan, "premium key redeemed");

        Ok(RedemptionResult {
            success: true,
            message: format!("Upgraded to the {} plan", key.plan),
            plan: Some(key.plan),
        })
    }

    /// Mint a new key for the given plan. Authorization is the caller's
    /// concern; this only writes the row.
    pub async fn mint(
        pool: &SqlitePool,
        plan: PlanType,
        created_by: Uuid,
    ) -> Result<PremiumKey, PremiumKeyError> {
        let code = format!(
            "CW-{}-{}",
            plan.to_string().to_uppercase(),
            Uuid::new_v4().simple()
        );
        let key = PremiumKey::create(pool, &code, plan, Some(created_by)).await?;

        info!(key_id = %key.id, plan = %plan, "premium key minted");

        Ok(key)
    }
}
