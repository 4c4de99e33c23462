/// Invitation model
///
/// Single-use tokens that grow an organization's roster. A token moves
/// pending → accepted exactly once; the transition is a conditional update
/// keyed on the pending status so concurrent redemptions cannot both win.
/// There is no expiry timestamp: any "valid for 24 hours" wording is
/// display copy, not enforced here.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE invitation_status AS ENUM ('pending', 'accepted', 'expired');
///
/// CREATE TABLE invitations (
///     token VARCHAR(64) PRIMARY KEY,
///     org_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     inviter_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status invitation_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Invitation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

/// Invitation model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    /// Unguessable token; doubles as the primary key
    pub token: String,

    /// Organization the invite admits into
    pub org_id: Uuid,

    /// Member who generated the invite
    pub inviter_id: Uuid,

    /// Lifecycle status
    pub status: InvitationStatus,

    /// When the invite was generated
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Creates a pending invitation
    pub async fn create(
        pool: &PgPool,
        token: &str,
        org_id: Uuid,
        inviter_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (token, org_id, inviter_id)
            VALUES ($1, $2, $3)
            RETURNING token, org_id, inviter_id, status, created_at
            "#,
        )
        .bind(token)
        .bind(org_id)
        .bind(inviter_id)
        .fetch_one(pool)
        .await?;

        Ok(invitation)
    }

    /// Looks up a still-pending invitation by token
    pub async fn find_pending(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT token, org_id, inviter_id, status, created_at
            FROM invitations
            WHERE token = $1 AND status = 'pending'
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Marks a pending invitation accepted
    ///
    /// Conditional on the row still being pending; returns false when a
    /// concurrent redemption got there first (or the token never existed).
    pub async fn mark_accepted(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'accepted'
            WHERE token = $1 AND status = 'pending'
            "#,
        )
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
