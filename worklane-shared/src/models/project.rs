/// Project model
///
/// Projects own the ordered task set and the `task_count` field that backs
/// the sequence allocator. `task_count` only ever increases, and is touched
/// exclusively through `sequence::next_task_sequence`, never read-modified
/// by callers, so displayed task IDs are never reused even across deletes.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     org_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     key VARCHAR(16) NOT NULL,
///     description TEXT,
///     task_count BIGINT NOT NULL DEFAULT 0,
///     invite_code VARCHAR(64) UNIQUE,
///     member_user_ids UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning organization
    pub org_id: Uuid,

    /// Display name
    pub name: String,

    /// Short code used as the human-ID prefix (e.g. "PRO" in "PRO-17")
    pub key: String,

    /// Optional description
    pub description: Option<String>,

    /// Monotonic allocator state; source of the next sequential task number
    pub task_count: i64,

    /// Team invite code, if team-level invites are enabled for this project
    pub invite_code: Option<String>,

    /// Project-level member list (team invites add users here)
    pub member_user_ids: Vec<Uuid>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub org_id: Uuid,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
}

impl Project {
    /// Creates a project with a zeroed task counter
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (org_id, name, key, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, name, key, description, task_count,
                      invite_code, member_user_ids, created_at
            "#,
        )
        .bind(data.org_id)
        .bind(data.name)
        .bind(data.key)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, org_id, name, key, description, task_count,
                   invite_code, member_user_ids, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Resolves an organization's primary project (its oldest)
    ///
    /// The board and task-creation flows operate on this project.
    pub async fn primary_for_org(pool: &PgPool, org_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, org_id, name, key, description, task_count,
                   invite_code, member_user_ids, created_at
            FROM projects
            WHERE org_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(org_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by its team invite code
    pub async fn find_by_invite_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, org_id, name, key, description, task_count,
                   invite_code, member_user_ids, created_at
            FROM projects
            WHERE invite_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Adds a user to the project member list if not already present
    pub async fn add_member(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE projects
            SET member_user_ids = array_append(member_user_ids, $2)
            WHERE id = $1 AND NOT (member_user_ids @> ARRAY[$2]::uuid[])
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
