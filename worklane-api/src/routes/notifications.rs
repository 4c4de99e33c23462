/// Inbox endpoints
///
/// Notifications are always scoped to the session's recipient and current
/// organization; there is no way to read or mark another member's inbox.
///
/// # Endpoints
///
/// - `GET  /v1/notifications?page=N` - One page of the inbox (newest first)
/// - `POST /v1/notifications/:id/read` - Mark one notification read
/// - `POST /v1/notifications/read-all` - Mark the whole inbox read
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use worklane_shared::auth::IdentityContext;
use worklane_shared::models::notification::{Notification, NotificationPage};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Page selector query
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// One page of the caller's inbox
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<NotificationPage>> {
    let page = Notification::list_page(
        &state.db,
        identity.user_id,
        identity.org_id,
        query.page.unwrap_or(1),
    )
    .await?;

    Ok(Json(page))
}

/// Mark one notification read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = Notification::mark_read(&state.db, id, identity.user_id).await?;

    if !updated {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "read": true })))
}

/// Mark the caller's whole inbox read for the current org
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated =
        Notification::mark_all_read(&state.db, identity.user_id, identity.org_id).await?;

    Ok(Json(serde_json::json!({ "updated": updated })))
}
