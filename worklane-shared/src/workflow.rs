/// Task workflow engine
///
/// Every mutating operation here follows the same shape: perform the
/// primary write, then return a [`WorkflowOutcome`] carrying the audit and
/// notification intents for the caller to dispatch. The primary write is
/// authoritative; a lost intent never invalidates it.
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::IdentityContext;
use crate::effects::{SideEffect, WorkflowOutcome};
use crate::error::{DomainError, DomainResult};
use crate::mentions;
use crate::models::action_log::AppendEntry;
use crate::models::project::Project;
use crate::models::task::{status, InsertTask, Task, TaskChanges, TaskKind, TaskPriority};
use crate::sequence;

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<TaskKind>,
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Uuid>,
    pub sort_order: Option<i64>,
    pub tags: Vec<String>,
    pub story_points: Option<i32>,
}

/// Input for a partial task update
///
/// `assignee_id` distinguishes "clear" (`Some(None)`) from "unchanged"
/// (`None`), mirroring `TaskChanges`.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
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

/// One board column with its tasks in rank order
#[derive(Debug, Clone, serde::Serialize)]
pub struct BoardColumn {
    pub status: String,
    pub tasks: Vec<Task>,
}

fn validate_status(s: &str) -> DomainResult<()> {
    if status::is_valid(s) {
        return Ok(());
    }
    Err(DomainError::Validation(format!(
        "unknown status '{}'",
        s
    )))
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".into()));
    }
    Ok(())
}

fn audit_effect(
    identity: &IdentityContext,
    action: &str,
    task: &Task,
    details: Option<String>,
) -> SideEffect {
    SideEffect::Audit(AppendEntry {
        org_id: identity.org_id,
        actor_id: identity.user_id,
        action: action.to_string(),
        target_id: Some(task.human_id.clone()),
        target_type: Some("Task".to_string()),
        details,
    })
}

fn mention_scan_effect(identity: &IdentityContext, task: &Task, text: &str) -> SideEffect {
    SideEffect::ScanMentions {
        org_id: identity.org_id,
        actor_id: identity.user_id,
        task_human_id: task.human_id.clone(),
        text: text.to_string(),
    }
}

/// Creates a task in the org's primary project
///
/// Allocates the next display ID atomically, so the task number is unique
/// and never reused even if this task is later purged. Hashtags in the
/// description are folded into the tag list alongside the explicit tags.
pub async fn create_task(
    pool: &PgPool,
    identity: &IdentityContext,
    input: CreateTaskInput,
) -> DomainResult<WorkflowOutcome<Task>> {
    validate_title(&input.title)?;

    let new_status = input.status.unwrap_or_else(|| status::TODO.to_string());
    validate_status(&new_status)?;

    let project = Project::primary_for_org(pool, identity.org_id)
        .await?
        .ok_or(DomainError::NotFound("project"))?;

    // Allocation happens before the insert; if the insert fails the number
    // is burned, which is acceptable (IDs are unique, not dense).
    let allocation = sequence::next_task_sequence(pool, project.id).await?;
    let human_id = allocation.human_id();

    let tags = mentions::union_tags(input.tags, input.description.as_deref());

    let task = Task::create(
        pool,
        InsertTask {
            project_id: project.id,
            title: input.title,
            description: input.description.clone(),
            kind: input.kind.unwrap_or(TaskKind::Task),
            status: new_status,
            priority: input.priority.unwrap_or(TaskPriority::Medium),
            assignee_id: input.assignee_id,
            sort_order: input.sort_order.unwrap_or(0),
            tags,
            story_points: input.story_points,
            human_id,
        },
    )
    .await?;

    let mut effects = vec![audit_effect(
        identity,
        "created task",
        &task,
        Some(task.title.clone()),
    )];
    if let Some(description) = &input.description {
        effects.push(mention_scan_effect(identity, &task, description));
    }

    Ok(WorkflowOutcome::with_effects(task, effects))
}

/// Applies a partial update to a task
///
/// When a new description is supplied its hashtags are re-derived and
/// unioned with the tag list, and the description is re-scanned for
/// mentions. Fields left unsupplied are untouched.
pub async fn update_task(
    pool: &PgPool,
    identity: &IdentityContext,
    task_id: Uuid,
    input: UpdateTaskInput,
) -> DomainResult<WorkflowOutcome<Task>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(new_status) = &input.status {
        validate_status(new_status)?;
    }

    let existing = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(DomainError::NotFound("task"))?;

    let tags = match (&input.description, input.tags) {
        // New description: union its hashtags into whichever tag list applies
        (Some(description), Some(explicit)) => {
            Some(mentions::union_tags(explicit, Some(description.as_str())))
        }
        (Some(description), None) => Some(mentions::union_tags(
            existing.tags.clone(),
            Some(description.as_str()),
        )),
        (None, explicit) => explicit,
    };

    let changes = TaskChanges {
        title: input.title,
        description: input.description.clone(),
        kind: input.kind,
        status: input.status,
        priority: input.priority,
        assignee_id: input.assignee_id,
        tags,
        story_points: input.story_points,
        backlog_reason: input.backlog_reason,
    };

    let task = if changes.is_empty() {
        existing
    } else {
        Task::apply_changes(pool, task_id, changes)
            .await?
            .ok_or(DomainError::NotFound("task"))?
    };

    let mut effects = vec![audit_effect(
        identity,
        "updated task",
        &task,
        Some(task.title.clone()),
    )];
    if let Some(description) = &input.description {
        effects.push(mention_scan_effect(identity, &task, description));
    }

    Ok(WorkflowOutcome::with_effects(task, effects))
}

/// Moves a task to a workflow column at a caller-supplied rank
///
/// Concurrent moves of the same task resolve last-writer-wins.
pub async fn move_task(
    pool: &PgPool,
    identity: &IdentityContext,
    task_id: Uuid,
    new_status: &str,
    sort_order: i64,
) -> DomainResult<WorkflowOutcome<Task>> {
    validate_status(new_status)?;

    let task = Task::set_status_and_order(pool, task_id, new_status, sort_order)
        .await?
        .ok_or(DomainError::NotFound("task"))?;

    let effects = vec![audit_effect(
        identity,
        "moved task",
        &task,
        Some(format!("to {}", new_status)),
    )];

    Ok(WorkflowOutcome::with_effects(task, effects))
}

/// Moves a task to the trash (soft delete)
pub async fn soft_delete_task(
    pool: &PgPool,
    identity: &IdentityContext,
    task_id: Uuid,
) -> DomainResult<WorkflowOutcome<Task>> {
    let task = Task::soft_delete(pool, task_id)
        .await?
        .ok_or(DomainError::NotFound("task"))?;

    let effects = vec![audit_effect(
        identity,
        "deleted task",
        &task,
        Some(format!("Moved task {} to trash", task.human_id)),
    )];

    Ok(WorkflowOutcome::with_effects(task, effects))
}

/// Restores a task from the trash
pub async fn restore_task(
    pool: &PgPool,
    identity: &IdentityContext,
    task_id: Uuid,
) -> DomainResult<WorkflowOutcome<Task>> {
    let task = Task::restore(pool, task_id)
        .await?
        .ok_or(DomainError::NotFound("task"))?;

    let effects = vec![audit_effect(identity, "restored task", &task, None)];

    Ok(WorkflowOutcome::with_effects(task, effects))
}

/// Permanently removes a task
///
/// Comments and notifications that reference the task survive as orphans;
/// readers of those records tolerate a missing task.
pub async fn purge_task(
    pool: &PgPool,
    identity: &IdentityContext,
    task_id: Uuid,
) -> DomainResult<WorkflowOutcome<()>> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(DomainError::NotFound("task"))?;

    if !Task::purge(pool, task_id).await? {
        // Lost a race with another purge
        return Err(DomainError::NotFound("task"));
    }

    let effects = vec![audit_effect(
        identity,
        "permanently deleted task",
        &task,
        Some(task.title.clone()),
    )];

    Ok(WorkflowOutcome::with_effects((), effects))
}

/// The org's board: active tasks of the primary project grouped into the
/// five workflow columns, rank order within each
pub async fn board(pool: &PgPool, identity: &IdentityContext) -> DomainResult<Vec<BoardColumn>> {
    let project = Project::primary_for_org(pool, identity.org_id)
        .await?
        .ok_or(DomainError::NotFound("project"))?;

    let tasks = Task::list_active_by_project(pool, project.id).await?;

    Ok(group_into_columns(tasks))
}

/// The org's trash: soft-deleted tasks across all projects, newest first
pub async fn list_trash(pool: &PgPool, identity: &IdentityContext) -> DomainResult<Vec<Task>> {
    let tasks = Task::list_trash_by_org(pool, identity.org_id).await?;
    Ok(tasks)
}

fn group_into_columns(tasks: Vec<Task>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = status::ALL
        .iter()
        .map(|s| BoardColumn {
            status: s.to_string(),
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
            column.tasks.push(task);
        }
        // A task whose status string matches no column is unreachable via
        // this engine (the CHECK constraint enforces the same set).
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_with_status(s: &str, order: i64) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: format!("{} #{}", s, order),
            description: None,
            kind: TaskKind::Task,
            status: s.to_string(),
            priority: TaskPriority::Medium,
            assignee_id: None,
            sort_order: order,
            tags: vec![],
            story_points: None,
            human_id: format!("TST-{}", order),
            backlog_reason: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_status() {
        assert!(validate_status("Done").is_ok());
        assert!(validate_status("done").is_err());
        assert!(validate_status("Archived").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Fix the build").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_group_into_columns_covers_all_statuses() {
        let columns = group_into_columns(vec![]);
        let names: Vec<&str> = columns.iter().map(|c| c.status.as_str()).collect();
        assert_eq!(names, vec!["Backlog", "Todo", "In Progress", "Review", "Done"]);
    }

    #[test]
    fn test_group_into_columns_preserves_input_order() {
        let tasks = vec![
            task_with_status("Todo", 1),
            task_with_status("Done", 1),
            task_with_status("Todo", 2),
        ];
        let columns = group_into_columns(tasks);

        let todo = columns.iter().find(|c| c.status == "Todo").unwrap();
        assert_eq!(todo.tasks.len(), 2);
        assert_eq!(todo.tasks[0].sort_order, 1);
        assert_eq!(todo.tasks[1].sort_order, 2);

        let done = columns.iter().find(|c| c.status == "Done").unwrap();
        assert_eq!(done.tasks.len(), 1);
    }
}
