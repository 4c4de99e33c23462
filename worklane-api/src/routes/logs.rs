/// Audit log endpoint
///
/// Serves the capped action log: 30 entries per page, never more than the
/// newest 500 per organization regardless of how many exist.
///
/// # Endpoint
///
/// ```text
/// GET /v1/logs?page=N
/// ```
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use worklane_shared::audit::{self, AuditPage};
use worklane_shared::auth::IdentityContext;

use crate::{app::AppState, error::ApiResult};

/// Page selector query
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// One page of the current org's audit log, newest first
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<AuditPage>> {
    let page = audit::list(&state.db, identity.org_id, query.page.unwrap_or(1)).await?;
    Ok(Json(page))
}
