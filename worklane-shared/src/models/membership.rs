/// Membership model
///
/// Org-scoped user roster with per-organization usernames. The compound
/// unique index on `(org_id, username)` is the concurrency guard for invite
/// redemption: a constraint violation there is the expected `UsernameTaken`
/// outcome of a race, handled in `error::DomainError::from_membership_insert`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('owner', 'member');
///
/// CREATE TABLE memberships (
///     org_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     username VARCHAR(64) NOT NULL,
///     role membership_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (org_id, user_id),
///     CONSTRAINT memberships_org_username_key UNIQUE (org_id, username)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles within an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Organization creator
    Owner,

    /// Everyone who joined via invite
    Member,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Member => "member",
        }
    }
}

/// Membership model representing a user's place in one organization
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Organization ID
    pub org_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Handle unique within the organization, used for @mention resolution
    pub username: String,

    /// Role within the organization
    pub role: MembershipRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub role: MembershipRole,
}

/// A roster entry as shown to callers: membership joined to user identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberProfile {
    /// User ID
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// Org-scoped username
    pub username: String,

    /// Role as a display string
    pub role: String,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a membership (adds a user to an organization)
    ///
    /// # Errors
    ///
    /// Returns a database error carrying the unique-constraint violation when
    /// the username (or the user) is already present in the organization;
    /// callers on the redemption path translate that to `UsernameTaken`.
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (org_id, user_id, username, role)
            VALUES ($1, $2, $3, $4)
            RETURNING org_id, user_id, username, role, joined_at
            "#,
        )
        .bind(data.org_id)
        .bind(data.user_id)
        .bind(data.username)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds a specific membership
    pub async fn find(
        pool: &PgPool,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT org_id, user_id, username, role, joined_at
            FROM memberships
            WHERE org_id = $1 AND user_id = $2
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks whether a username is already held within an organization
    pub async fn username_exists(
        pool: &PgPool,
        org_id: Uuid,
        username: &str,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE org_id = $1 AND username = $2
            )
            "#,
        )
        .bind(org_id)
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Resolves a set of org-scoped usernames to memberships
    ///
    /// Usernames with no matching row are simply absent from the result.
    pub async fn find_by_usernames(
        pool: &PgPool,
        org_id: Uuid,
        usernames: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT org_id, user_id, username, role, joined_at
            FROM memberships
            WHERE org_id = $1 AND username = ANY($2)
            "#,
        )
        .bind(org_id)
        .bind(usernames)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Lists an organization's roster, joined to user identity for display
    pub async fn list_profiles(pool: &PgPool, org_id: Uuid) -> Result<Vec<MemberProfile>, sqlx::Error> {
        let members = sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT m.user_id, u.name, u.email, u.avatar_url,
                   m.username, m.role::text AS role, m.joined_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.org_id = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(org_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Deletes a membership (user leaves the organization)
    pub async fn delete(pool: &PgPool, org_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE org_id = $1 AND user_id = $2")
            .bind(org_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(MembershipRole::Owner.as_str(), "owner");
        assert_eq!(MembershipRole::Member.as_str(), "member");
    }

    // Roster precedence and redemption races are covered in the
    // database-backed tests in tests/engine_tests.rs.
}
