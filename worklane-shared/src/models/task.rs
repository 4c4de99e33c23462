/// Task model and database operations
///
/// Tasks move through workflow columns identified by literal display strings
/// (`Backlog`, `Todo`, `In Progress`, `Review`, `Done`). No column is
/// terminal; `Done` accepts further moves. Within a column, `sort_order`
/// defines a strict display ordering but values need not be contiguous;
/// the caller computes ranks and this model stores them verbatim.
///
/// Deletion is two-phase: `soft_delete` stamps `deleted_at` (the task
/// disappears from active queries, defined as `deleted_at IS NULL`),
/// `restore` clears it, and `purge` removes the row for good.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_kind AS ENUM ('Epic', 'Story', 'Task', 'Bug');
/// CREATE TYPE task_priority AS ENUM ('High', 'Medium', 'Low');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(500) NOT NULL,
///     description TEXT,
///     kind task_kind NOT NULL DEFAULT 'Task',
///     status TEXT NOT NULL DEFAULT 'Todo',
///     priority task_priority NOT NULL DEFAULT 'Medium',
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     sort_order BIGINT NOT NULL DEFAULT 0,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     story_points INTEGER,
///     human_id TEXT NOT NULL,
///     backlog_reason TEXT,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workflow column identifiers
///
/// These are exact display strings, case- and space-sensitive, stored as
/// text rather than a translated enum.
pub mod status {
    pub const BACKLOG: &str = "Backlog";
    pub const TODO: &str = "Todo";
    pub const IN_PROGRESS: &str = "In Progress";
    pub const REVIEW: &str = "Review";
    pub const DONE: &str = "Done";

    /// All columns in board display order
    pub const ALL: [&str; 5] = [BACKLOG, TODO, IN_PROGRESS, REVIEW, DONE];

    pub fn is_valid(s: &str) -> bool {
        ALL.contains(&s)
    }
}

/// Task classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_kind", rename_all = "PascalCase")]
pub enum TaskKind {
    Epic,
    Story,
    Task,
    Bug,
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "PascalCase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Internal record ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Title
    pub title: String,

    /// Free-text description; source of hashtags and @mentions
    pub description: Option<String>,

    /// Classification (Epic/Story/Task/Bug)
    pub kind: TaskKind,

    /// Workflow column, one of `status::ALL`
    pub status: String,

    /// Priority
    pub priority: TaskPriority,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// Caller-supplied rank within the status column
    pub sort_order: i64,

    /// Tags: explicit tags unioned with hashtags from the description
    pub tags: Vec<String>,

    /// Optional story point estimate
    pub story_points: Option<i32>,

    /// Display identifier, e.g. "PRO-17"; allocated once, never reused
    pub human_id: String,

    /// Why the task sits in the backlog, if recorded
    pub backlog_reason: Option<String>,

    /// Soft-delete stamp; null means active
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a task row (human ID already allocated)
#[derive(Debug, Clone)]
pub struct InsertTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: TaskKind,
    pub status: String,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    pub sort_order: i64,
    pub tags: Vec<String>,
    pub story_points: Option<i32>,
    pub human_id: String,
}

/// Partial update: only `Some` fields are written
///
/// `assignee_id` is doubly optional so "clear the assignee" (supplied but
/// empty) stays distinguishable from "leave it alone" (not supplied).
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<TaskKind>,
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub story_points: Option<i32>,
    pub backlog_reason: Option<String>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.kind.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.tags.is_none()
            && self.story_points.is_none()
            && self.backlog_reason.is_none()
    }
}

const TASK_COLUMNS: &str = "id, project_id, title, description, kind, status, priority, \
     assignee_id, sort_order, tags, story_points, human_id, backlog_reason, \
     deleted_at, created_at, updated_at";

impl Task {
    /// Inserts a task row
    pub async fn create(pool: &PgPool, data: InsertTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, title, description, kind, status, priority,
                               assignee_id, sort_order, tags, story_points, human_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.kind)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.assignee_id)
        .bind(data.sort_order)
        .bind(data.tags)
        .bind(data.story_points)
        .bind(data.human_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID (soft-deleted rows included)
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update and bumps `updated_at`
    ///
    /// Builds the SET clause dynamically so unsupplied fields are never
    /// touched. Returns the updated row, or None if the task is gone.
    pub async fn apply_changes(
        pool: &PgPool,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        macro_rules! add_set {
            ($field:expr, $column:literal) => {
                if $field.is_some() {
                    bind_count += 1;
                    query.push_str(&format!(", {} = ${}", $column, bind_count));
                }
            };
        }

        add_set!(changes.title, "title");
        add_set!(changes.description, "description");
        add_set!(changes.kind, "kind");
        add_set!(changes.status, "status");
        add_set!(changes.priority, "priority");
        add_set!(changes.assignee_id, "assignee_id");
        add_set!(changes.tags, "tags");
        add_set!(changes.story_points, "story_points");
        add_set!(changes.backlog_reason, "backlog_reason");

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = changes.title {
            q = q.bind(title);
        }
        if let Some(description) = changes.description {
            q = q.bind(description);
        }
        if let Some(kind) = changes.kind {
            q = q.bind(kind);
        }
        if let Some(status) = changes.status {
            q = q.bind(status);
        }
        if let Some(priority) = changes.priority {
            q = q.bind(priority);
        }
        if let Some(assignee_id) = changes.assignee_id {
            // Binding None here writes NULL, which is how an explicit
            // "clear assignee" lands.
            q = q.bind(assignee_id);
        }
        if let Some(tags) = changes.tags {
            q = q.bind(tags);
        }
        if let Some(story_points) = changes.story_points {
            q = q.bind(story_points);
        }
        if let Some(backlog_reason) = changes.backlog_reason {
            q = q.bind(backlog_reason);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Writes status and rank verbatim (board move)
    ///
    /// Last writer wins under concurrent moves; there is no concurrency
    /// token on tasks.
    pub async fn set_status_and_order(
        pool: &PgPool,
        id: Uuid,
        new_status: &str,
        sort_order: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = $2, sort_order = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(new_status)
        .bind(sort_order)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Stamps `deleted_at`, removing the task from active queries
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Clears `deleted_at`, returning the task to active listings
    pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET deleted_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Irreversibly removes the row
    ///
    /// Comments and notifications referencing the task are left in place.
    pub async fn purge(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a project's active tasks ordered by rank
    pub async fn list_active_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1 AND deleted_at IS NULL
            ORDER BY sort_order ASC, created_at ASC
            "#,
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists soft-deleted tasks across every project in an org, newest-deleted first
    pub async fn list_trash_by_org(pool: &PgPool, org_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.kind, t.status,
                   t.priority, t.assignee_id, t.sort_order, t.tags, t.story_points,
                   t.human_id, t.backlog_reason, t.deleted_at, t.created_at, t.updated_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE p.org_id = $1 AND t.deleted_at IS NOT NULL
            ORDER BY t.deleted_at DESC
            "#,
        ))
        .bind(org_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_literals() {
        assert!(status::is_valid("Backlog"));
        assert!(status::is_valid("Todo"));
        assert!(status::is_valid("In Progress"));
        assert!(status::is_valid("Review"));
        assert!(status::is_valid("Done"));

        // Exact strings only: no case folding, no space normalization
        assert!(!status::is_valid("todo"));
        assert!(!status::is_valid("InProgress"));
        assert!(!status::is_valid("in progress"));
        assert!(!status::is_valid(""));
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(TaskChanges::default().is_empty());

        let changes = TaskChanges {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());

        // An explicit clear counts as a supplied change
        let changes = TaskChanges {
            assignee_id: Some(None),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
