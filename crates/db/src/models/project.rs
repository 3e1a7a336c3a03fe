use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Deployment state of a project
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeployStatus {
    Pending,
    Live,
    Error,
    Archived,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub deploy_status: DeployStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

impl Project {
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO projects (id, user_id, name, description)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, name, description, deploy_status, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_user_id(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, name, description, deploy_status, created_at, updated_at
               FROM projects
               WHERE user_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Mark a project live after a successful generation. Scoped to the
    /// owner's rows; returns the number of rows touched.
    pub async fn mark_live(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE projects
               SET deploy_status = $1, updated_at = CURRENT_TIMESTAMP
               WHERE id = $2 AND user_id = $3"#,
        )
        .bind(DeployStatus::Live)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
