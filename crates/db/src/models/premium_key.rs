use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use ts_rs::TS;
use uuid::Uuid;

use super::profile::PlanType;

/// Redeemable key that upgrades an account to a paid plan
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PremiumKey {
    pub id: Uuid,
    pub key_code: String,
    pub plan: PlanType,
    pub is_used: bool,
    pub created_by: Option<Uuid>,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PremiumKey {
    pub async fn create(
        executor: impl SqliteExecutor<'_>,
        key_code: &str,
        plan: PlanType,
        created_by: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO premium_keys (id, key_code, plan, created_by)
               VALUES ($1, $2, $3, $4)
               RETURNING id, key_code, plan, is_used, created_by, used_by, used_at, created_at"#,
        )
        .bind(id)
        .bind(key_code)
        .bind(plan)
        .bind(created_by)
        .fetch_one(executor)
        .await
    }

    pub async fn find_unused_by_code(
        executor: impl SqliteExecutor<'_>,
        key_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, key_code, plan, is_used, created_by, used_by, used_at, created_at
               FROM premium_keys
               WHERE key_code = $1 AND is_used = 0"#,
        )
        .bind(key_code)
        .fetch_optional(executor)
        .await
    }

    /// Consume the key. Conditioned on `is_used = 0` so two transactions
    /// racing on the same key cannot both succeed.
    pub async fn mark_used(
        executor: impl SqliteExecutor<'_>,
        id: Uuid,
        used_by: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE premium_keys
               SET is_used = 1, used_by = $1, used_at = CURRENT_TIMESTAMP
               WHERE id = $2 AND is_used = 0"#,
        )
        .bind(used_by)
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
