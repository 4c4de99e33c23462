/// Task discussion endpoints
///
/// Comments are append-only and listed oldest-first. `task_id` is not a
/// foreign key, so comments on a purged task remain readable as orphans;
/// posting to a missing task is rejected here instead.
///
/// # Endpoints
///
/// - `GET  /v1/tasks/:id/comments` - List a task's comments
/// - `POST /v1/tasks/:id/comments` - Add a comment
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use worklane_shared::auth::IdentityContext;
use worklane_shared::models::comment::{Comment, CommentWithAuthor};
use worklane_shared::models::task::Task;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Add comment request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Comment body
    #[validate(length(min = 1, max = 10_000, message = "Content must be 1-10000 characters"))]
    pub content: String,
}

/// List a task's comments, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(_identity): Extension<IdentityContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    let comments = Comment::list_by_task(&state.db, task_id).await?;
    Ok(Json(comments))
}

/// Add a comment to a task
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<Json<Comment>> {
    req.validate().map_err(crate::error::validation_error)?;

    if Task::find_by_id(&state.db, task_id).await?.is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    let comment = Comment::create(&state.db, task_id, identity.user_id, &req.content).await?;

    Ok(Json(comment))
}
