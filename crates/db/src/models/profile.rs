use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Subscription tier for an account
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanType {
    Free,
    Premium,
    Ultra,
}

impl PlanType {
    /// Token allowance granted when a key for this plan is redeemed.
    pub fn token_grant(&self) -> i64 {
        match self {
            PlanType::Free => 0,
            PlanType::Premium => 1_000_000_000,
            PlanType::Ultra => 2_000_000_000,
        }
    }
}

/// User profile with the token ledger
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub plan: PlanType,
    pub selected_character: Option<String>,
    pub token_balance: i64,
    pub token_consumed: i64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger counters as they stand after a write
#[derive(Debug, Clone, Copy, FromRow)]
pub struct TokenLedger {
    pub token_balance: i64,
    pub token_consumed: i64,
}

impl Profile {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, email, display_name, plan, selected_character,
                      token_balance, token_consumed, is_admin, created_at, updated_at
               FROM profiles
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO profiles (id, email, display_name)
               VALUES ($1, $2, $3)
               RETURNING id, email, display_name, plan, selected_character,
                         token_balance, token_consumed, is_admin, created_at, updated_at"#,
        )
        .bind(id)
        .bind(email)
        .bind(display_name)
        .fetch_one(pool)
        .await
    }

    /// Debit `tokens` from the balance and add them to lifetime consumption in
    /// a single conditional write. Returns `None` when the balance no longer
    /// covers the debit (a concurrent request got there first).
    pub async fn debit_tokens(
        pool: &SqlitePool,
        id: Uuid,
        tokens: i64,
    ) -> Result<Option<TokenLedger>, sqlx::Error> {
        sqlx::query_as::<_, TokenLedger>(
            r#"UPDATE profiles
               SET token_balance = token_balance - $1,
                   token_consumed = token_consumed + $1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $2 AND token_balance >= $1
               RETURNING token_balance, token_consumed"#,
        )
        .bind(tokens)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Current ledger counters without the full profile row.
    pub async fn ledger(pool: &SqlitePool, id: Uuid) -> Result<Option<TokenLedger>, sqlx::Error> {
        sqlx::query_as::<_, TokenLedger>(
            "SELECT token_balance, token_consumed FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Upgrade the plan and grant its token allowance. Runs against any
    /// executor so key redemption can call it inside a transaction.
    pub async fn apply_plan(
        executor: impl SqliteExecutor<'_>,
        id: Uuid,
        plan: PlanType,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE profiles
               SET plan = $1,
                   token_balance = token_balance + $2,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $3"#,
        )
        .bind(plan)
        .bind(plan.token_grant())
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
