/// Organization lifecycle and roster endpoints
///
/// # Endpoints
///
/// - `POST /v1/orgs` - Create an organization (with default project)
/// - `GET  /v1/orgs` - List the caller's organizations
/// - `GET  /v1/orgs/:id/members` - List an organization's roster
/// - `POST /v1/orgs/:id/leave` - Leave an organization
/// - `POST /v1/orgs/:id/switch` - Mint a session scoped to another org
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use worklane_shared::auth::{session, IdentityContext};
use worklane_shared::effects;
use worklane_shared::models::membership::MemberProfile;
use worklane_shared::models::organization::Organization;
use worklane_shared::roster;

use crate::{app::AppState, error::ApiResult};

/// Create organization request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrgRequest {
    /// Organization display name (must be globally unique)
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Switch organization response
#[derive(Debug, Serialize)]
pub struct SwitchOrgResponse {
    /// Fresh session token scoped to the target organization
    pub token: String,
}

/// Create an organization
///
/// The caller becomes its owner and a default project is created alongside.
pub async fn create_org(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<CreateOrgRequest>,
) -> ApiResult<Json<Organization>> {
    req.validate().map_err(crate::error::validation_error)?;

    let outcome = roster::create_organization(&state.db, identity.user_id, &req.name).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// List every organization the caller belongs to
pub async fn list_orgs(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
) -> ApiResult<Json<Vec<Organization>>> {
    let orgs = roster::organizations_for_user(&state.db, identity.user_id).await?;
    Ok(Json(orgs))
}

/// List an organization's members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(_identity): Extension<IdentityContext>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberProfile>>> {
    let members = roster::list_members(&state.db, org_id).await?;
    Ok(Json(members))
}

/// Leave an organization
pub async fn leave_org(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let outcome = roster::leave_organization(&state.db, &identity, org_id).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(serde_json::json!({ "left": true })))
}

/// Re-scope the session to another organization the caller belongs to
pub async fn switch_org(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<SwitchOrgResponse>> {
    let token =
        session::switch_organization(&state.db, &identity, org_id, state.session_secret()).await?;

    Ok(Json(SwitchOrgResponse { token }))
}
