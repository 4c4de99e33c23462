/// Organization model
///
/// Organizations are the tenancy boundary. `member_user_ids` is a legacy
/// membership list kept from before the memberships table existed; it is
/// still maintained on join/leave so older organizations keep working, but
/// the memberships table is the first-class source (see `roster`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     member_user_ids UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Organization model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    /// Unique organization ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// URL-safe unique slug
    pub slug: String,

    /// Legacy membership list (fallback source for the member roster)
    pub member_user_ids: Vec<Uuid>,

    /// When the organization was created
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Creates an organization with its initial member
    pub async fn create(
        pool: &PgPool,
        name: &str,
        slug: &str,
        initial_member: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, slug, member_user_ids)
            VALUES ($1, $2, ARRAY[$3]::uuid[])
            RETURNING id, name, slug, member_user_ids, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(initial_member)
        .fetch_one(pool)
        .await?;

        Ok(org)
    }

    /// Finds an organization by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, slug, member_user_ids, created_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(org)
    }

    /// Checks whether a display name is already in use
    pub async fn name_exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE name = $1)")
                .bind(name)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Checks whether a user belongs to the organization
    ///
    /// Consults the memberships table first, then the legacy member list, so
    /// pre-migration organizations still authorize correctly.
    pub async fn is_member(pool: &PgPool, org_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let is_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships WHERE org_id = $1 AND user_id = $2
            ) OR EXISTS(
                SELECT 1 FROM organizations WHERE id = $1 AND member_user_ids @> ARRAY[$2]::uuid[]
            )
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(is_member)
    }

    /// Appends a user to the legacy member list if not already present
    pub async fn add_member(pool: &PgPool, org_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE organizations
            SET member_user_ids = array_append(member_user_ids, $2)
            WHERE id = $1 AND NOT (member_user_ids @> ARRAY[$2]::uuid[])
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a user from the legacy member list
    pub async fn remove_member(
        pool: &PgPool,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE organizations
            SET member_user_ids = array_remove(member_user_ids, $2)
            WHERE id = $1
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists every organization a user belongs to via the legacy member list
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let orgs = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, slug, member_user_ids, created_at
            FROM organizations
            WHERE member_user_ids @> ARRAY[$1]::uuid[]
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(orgs)
    }
}
