/// Invite generation, redemption, and team-code joins
///
/// # Endpoints
///
/// - `POST /v1/orgs/:id/invites` - Generate a single-use invite token
/// - `POST /v1/invites/redeem` - Redeem a token, choosing a username
/// - `POST /v1/invites/team/:code/join` - Join a project by its team code
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use worklane_shared::auth::IdentityContext;
use worklane_shared::effects;
use worklane_shared::invites::{self, GeneratedInvite};
use worklane_shared::models::membership::Membership;
use worklane_shared::models::project::Project;

use crate::{app::AppState, error::ApiResult};

/// Redeem invite request
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemInviteRequest {
    /// The invite token from the `/invite/{token}` link
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    /// Desired org-scoped username
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
}

/// Generate a single-use invite for an organization
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the organization
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<GeneratedInvite>> {
    let outcome = invites::generate_invite(&state.db, &identity, org_id).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Redeem an invite token
///
/// # Errors
///
/// - `400 Bad Request`: Token missing, already used, or lost a race
/// - `404 Not Found`: The inviting organization no longer exists
/// - `409 Conflict`: The chosen username is taken in that organization
pub async fn redeem_invite(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<RedeemInviteRequest>,
) -> ApiResult<Json<Membership>> {
    req.validate().map_err(crate::error::validation_error)?;

    let outcome =
        invites::redeem_invite(&state.db, identity.user_id, &req.token, &req.username).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}

/// Join a project by its reusable team code
pub async fn join_by_team_code(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(code): Path<String>,
) -> ApiResult<Json<Project>> {
    let outcome = invites::join_by_team_code(&state.db, identity.user_id, &code).await?;

    effects::dispatch(&state.db, outcome.effects).await;

    Ok(Json(outcome.value))
}
