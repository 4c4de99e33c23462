/// Action log model
///
/// Append-only record of mutating actions. Reads behave as if only the most
/// recent 500 entries per organization exist (see `audit` for the paging
/// rules); older rows may physically remain but are never served.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One audit entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActionLogEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// Organization scope
    pub org_id: Uuid,

    /// Who performed the action
    pub actor_id: Uuid,

    /// Short verb phrase, e.g. "created task"
    pub action: String,

    /// Identifier of the affected entity, if any
    pub target_id: Option<String>,

    /// Entity kind of the target, e.g. "Task"
    pub target_type: Option<String>,

    /// Free-text elaboration
    pub details: Option<String>,

    /// When the action happened
    pub created_at: DateTime<Utc>,
}

/// Input for appending an entry
#[derive(Debug, Clone)]
pub struct AppendEntry {
    pub org_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub target_id: Option<String>,
    pub target_type: Option<String>,
    pub details: Option<String>,
}

impl ActionLogEntry {
    /// Appends an entry (pure insert)
    pub async fn append(pool: &PgPool, entry: AppendEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO action_log (org_id, actor_id, action, target_id, target_type, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.org_id)
        .bind(entry.actor_id)
        .bind(entry.action)
        .bind(entry.target_id)
        .bind(entry.target_type)
        .bind(entry.details)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Fetches a window of an org's log, newest first
    pub async fn fetch_window(
        pool: &PgPool,
        org_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let entries = sqlx::query_as::<_, ActionLogEntry>(
            r#"
            SELECT id, org_id, actor_id, action, target_id, target_type, details, created_at
            FROM action_log
            WHERE org_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(org_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Counts an org's entries
    pub async fn count(pool: &PgPool, org_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM action_log WHERE org_id = $1")
            .bind(org_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
