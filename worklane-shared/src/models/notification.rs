/// Notification model
///
/// Rows in this table are the delivery sink for mention and system events:
/// one row per affected recipient (fan-out). Rows are only ever mutated by
/// read-state toggles, always scoped to the recipient so nobody can mark
/// another member's inbox.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE notification_kind AS ENUM ('mention', 'system', 'assignment');
///
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     recipient_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     org_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
///     kind notification_kind NOT NULL,
///     content TEXT NOT NULL,
///     link TEXT,
///     read BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::PgPool;
use uuid::Uuid;

/// Inbox page size
const PAGE_SIZE: i64 = 10;

/// OFFSET for a 1-based page number; saturates instead of overflowing on
/// absurd caller-supplied pages (Postgres just returns no rows)
fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(PAGE_SIZE)
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone @mentioned the recipient
    Mention,

    /// Membership and housekeeping announcements
    System,

    /// A task was assigned to the recipient
    Assignment,
}

// The batch insert binds kinds as `$n::notification_kind[]`; the derive
// only covers the scalar type, so the array element mapping is explicit.
impl PgHasArrayType for NotificationKind {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_notification_kind")
    }
}

/// Notification model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Recipient
    pub recipient_id: Uuid,

    /// Organization context
    pub org_id: Uuid,

    /// Category
    pub kind: NotificationKind,

    /// Human-readable message
    pub content: String,

    /// Optional deep link (e.g. to the mentioning task)
    pub link: Option<String>,

    /// Whether the recipient has seen it
    pub read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for one fan-out row
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient_id: Uuid,
    pub org_id: Uuid,
    pub kind: NotificationKind,
    pub content: String,
    pub link: Option<String>,
}

/// One page of a recipient's inbox
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total_pages: i64,
    pub unread_count: i64,
}

impl Notification {
    /// Inserts a single notification
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, org_id, kind, content, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, recipient_id, org_id, kind, content, link, read, created_at
            "#,
        )
        .bind(data.recipient_id)
        .bind(data.org_id)
        .bind(data.kind)
        .bind(data.content)
        .bind(data.link)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Inserts a batch of fan-out rows
    pub async fn create_many(
        pool: &PgPool,
        batch: Vec<CreateNotification>,
    ) -> Result<u64, sqlx::Error> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut recipient_ids = Vec::with_capacity(batch.len());
        let mut org_ids = Vec::with_capacity(batch.len());
        let mut kinds = Vec::with_capacity(batch.len());
        let mut contents = Vec::with_capacity(batch.len());
        let mut links = Vec::with_capacity(batch.len());

        for item in batch {
            recipient_ids.push(item.recipient_id);
            org_ids.push(item.org_id);
            kinds.push(item.kind);
            contents.push(item.content);
            links.push(item.link);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO notifications (recipient_id, org_id, kind, content, link)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::notification_kind[], $4::text[], $5::text[])
            "#,
        )
        .bind(recipient_ids)
        .bind(org_ids)
        .bind(kinds)
        .bind(contents)
        .bind(links)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// One page of the recipient's inbox for the current org, newest first
    pub async fn list_page(
        pool: &PgPool,
        recipient_id: Uuid,
        org_id: Uuid,
        page: i64,
    ) -> Result<NotificationPage, sqlx::Error> {
        let offset = page_offset(page);

        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, org_id, kind, content, link, read, created_at
            FROM notifications
            WHERE recipient_id = $1 AND org_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(recipient_id)
        .bind(org_id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND org_id = $2",
        )
        .bind(recipient_id)
        .bind(org_id)
        .fetch_one(pool)
        .await?;

        let (unread_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND org_id = $2 AND read = FALSE",
        )
        .bind(recipient_id)
        .bind(org_id)
        .fetch_one(pool)
        .await?;

        Ok(NotificationPage {
            notifications,
            total_pages: (count + PAGE_SIZE - 1) / PAGE_SIZE,
            unread_count,
        })
    }

    /// Marks one notification read, scoped to its recipient
    pub async fn mark_read(
        pool: &PgPool,
        id: Uuid,
        recipient_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the recipient's whole inbox read for the current org
    pub async fn mark_all_read(
        pool: &PgPool,
        recipient_id: Uuid,
        org_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE recipient_id = $1 AND org_id = $2 AND read = FALSE
            "#,
        )
        .bind(recipient_id)
        .bind(org_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_array_maps_to_enum_array() {
        assert_eq!(
            NotificationKind::array_type_info().to_string(),
            "_notification_kind"
        );
    }

    #[test]
    fn test_page_offset_never_overflows() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(-5), 0);
        assert_eq!(page_offset(3), 20);
        assert_eq!(page_offset(i64::MAX), i64::MAX);
    }
}
