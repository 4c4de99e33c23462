/// Board, task lifecycle, and trash endpoints
///
/// All endpoints require a session; the decoded identity arrives as a
/// request extension. Mutations run the shared workflow engine and then
/// dispatch its side-effect intents (audit entries, mention fan-outs)
/// best-effort after responding state is settled.
///
/// # Endpoints
///
/// - `GET    /v1/board` - Active tasks grouped by workflow column
/// - `POST   /v1/tasks` - Create task
/// - `PATCH  /v1/tasks/:id` - Partial update
/// - `POST   /v1/tasks/:id/move` - Change column and rank
/// - `DELETE /v1/tasks/:id` - Move to trash
/// - `POST   /v1/tasks/:id/restore` - Restore from trash
/// - `DELETE /v1/tasks/:id/purge` - Remove permanently
/// - `GET    /v1/trash` - List soft-deleted tasks
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use worklane_shared::auth::IdentityContext;
use worklane_shared::effects;
use worklane_shared::models::task::{Task, TaskKind, TaskPriority};
use worklane_shared::workflow::{self, BoardColumn, CreateTaskInput, UpdateTaskInput};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    /// Free-text description; hashtags become tags, @mentions notify
    pub description: Option<String>,

    /// Classification (defaults to Task)
    pub kind: Option<TaskKind>,

    /// Workflow column (defaults to Todo)
    pub status: Option<String>,

    /// Priority (defaults to Medium)
    pub priority: Option<TaskPriority>,

    /// Initial assignee
    pub assignee_id: Option<Uuid>,

    /// Rank within the column (defaults to 0)
    pub sort_order: Option<i64>,

    /// Explicit tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Story point estimate
    pub story_points: Option<i32>,
}

/// Partial update request
///
/// Omitted fields are left untouched. `assignee_id` takes a UUID string to
/// set, or an empty string to clear the assignee.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<TaskKind>,
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub story_points: Option<i32>,
    pub backlog_reason: Option<String>,
}

/// Move request: target column plus caller-computed rank
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub status: String,
    pub sort_order: i64,
}

/// Purge response
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub purged: bool,
}

fn parse_assignee(raw: Option<String>) -> ApiResult<Option<Option<Uuid>>> {
    match raw {
        None => Ok(None),
        // Present but empty: clear the assignee
        Some(s) if s.is_empty() => Ok(Some(None)),
        Some(s) => {
            let id = s.parse::<Uuid>().map_err(|_| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "assignee_id".to_string(),
                    message: "Must be a UUID or empty string".to_string(),
                }])
            })?;
            Ok(Some(Some(id)))
        }
    }
}

/// Active tasks of the org's primary project, grouped by workflow column
pub async fn board(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
) -> ApiResult<Json<Vec<BoardColumn>>> {
    let columns = workflow::board(&state.db, &identity).await?;
    Ok(Json(columns))
}

/// Create a task
///
/// # Errors
///
/// - `404 Not Found`: The org has no project
/// - `422 Unprocessable Entity`: Validation failed (empty title, unknown status)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(crate::error::validation_error)?;

    let outcome = workflow::create_task(
        &state.db,
        &identity,
        CreateTaskInput {
            title: req.title,
            description: req.description,
            kind: req.kind,
            status: req.status,
            priority: req.priority,
            assignee_id: req.assignee_id,
            sort_order: req.sort_order,
            tags: req.tags,
            story_points: req.story_points,
        },
    )
    .await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Partially update a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(crate::error::validation_error)?;

    let assignee_id = parse_assignee(req.assignee_id)?;

    let outcome = workflow::update_task(
        &state.db,
        &identity,
        id,
        UpdateTaskInput {
            title: req.title,
            description: req.description,
            kind: req.kind,
            status: req.status,
            priority: req.priority,
            assignee_id,
            tags: req.tags,
            story_points: req.story_points,
            backlog_reason: req.backlog_reason,
        },
    )
    .await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Move a task to a column at a rank
pub async fn move_task(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<Task>> {
    let outcome =
        workflow::move_task(&state.db, &identity, id, &req.status, req.sort_order).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Move a task to the trash
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let outcome = workflow::soft_delete_task(&state.db, &identity, id).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Restore a task from the trash
pub async fn restore_task(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let outcome = workflow::restore_task(&state.db, &identity, id).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Permanently remove a task
pub async fn purge_task(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurgeResponse>> {
    let outcome = workflow::purge_task(&state.db, &identity, id).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(PurgeResponse { purged: true }))
}

/// List the org's soft-deleted tasks, newest-deleted first
pub async fn list_trash(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = workflow::list_trash(&state.db, &identity).await?;
    Ok(Json(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignee() {
        assert_eq!(parse_assignee(None).unwrap(), None);
        assert_eq!(parse_assignee(Some(String::new())).unwrap(), Some(None));

        let id = Uuid::new_v4();
        assert_eq!(
            parse_assignee(Some(id.to_string())).unwrap(),
            Some(Some(id))
        );

        assert!(parse_assignee(Some("not-a-uuid".to_string())).is_err());
    }
}
