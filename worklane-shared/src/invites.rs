/// Invitation engine
///
/// Two join paths exist. Token invites are single-use: a member generates
/// an unguessable token, someone redeems it exactly once, choosing their
/// org-scoped username in the process. Team codes on projects are reusable:
/// joining by code derives a username automatically and adds the user to
/// the project's member list as well.
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::IdentityContext;
use crate::effects::{SideEffect, WorkflowOutcome};
use crate::error::{DomainError, DomainResult};
use crate::models::action_log::AppendEntry;
use crate::models::invitation::Invitation;
use crate::models::membership::{CreateMembership, Membership, MembershipRole};
use crate::models::notification::NotificationKind;
use crate::models::organization::Organization;
use crate::models::project::Project;
use crate::roster;

/// A freshly generated invite
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedInvite {
    pub token: String,
    pub link: String,
}

/// 32 random bytes, hex-encoded
fn new_invite_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Generates a single-use invite token for an organization
///
/// Only current members may invite.
pub async fn generate_invite(
    pool: &PgPool,
    identity: &IdentityContext,
    org_id: Uuid,
) -> DomainResult<WorkflowOutcome<GeneratedInvite>> {
    if !Organization::is_member(pool, org_id, identity.user_id).await? {
        return Err(DomainError::Unauthorized);
    }

    let token = new_invite_token();
    Invitation::create(pool, &token, org_id, identity.user_id).await?;

    let invite = GeneratedInvite {
        link: format!("/invite/{}", token),
        token,
    };

    let effects = vec![SideEffect::Audit(AppendEntry {
        org_id,
        actor_id: identity.user_id,
        action: "generated invite".to_string(),
        target_id: None,
        target_type: Some("Invitation".to_string()),
        details: None,
    })];

    Ok(WorkflowOutcome::with_effects(invite, effects))
}

/// Redeems an invite token, admitting the user with the chosen username
///
/// At-most-once: the pending → accepted transition is conditional, so of
/// two concurrent redemptions exactly one succeeds and the other sees
/// `InvalidInvite`. The username precheck runs before anything else and
/// applies to existing members too; it is still advisory, since the
/// compound unique index on the roster is the real guard, and losing that
/// race surfaces as `UsernameTaken`. An existing member redeeming a token
/// keeps their current username, but the token is consumed and the join is
/// logged and announced all the same.
pub async fn redeem_invite(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    desired_username: &str,
) -> DomainResult<WorkflowOutcome<Membership>> {
    let username = desired_username.trim();
    if username.is_empty() {
        return Err(DomainError::Validation("username must not be empty".into()));
    }

    let invitation = Invitation::find_pending(pool, token)
        .await?
        .ok_or(DomainError::InvalidInvite)?;

    let org = Organization::find_by_id(pool, invitation.org_id)
        .await?
        .ok_or(DomainError::OrgNotFound)?;

    if Membership::username_exists(pool, org.id, username).await? {
        return Err(DomainError::UsernameTaken);
    }

    let existing = Membership::find(pool, org.id, user_id).await?;

    // Claim the token before touching the roster. Of two concurrent
    // redemptions exactly one wins this conditional update; the loser
    // leaves no roster changes behind.
    if !Invitation::mark_accepted(pool, token).await? {
        return Err(DomainError::InvalidInvite);
    }

    let membership = match existing {
        // Already in the org; the redemption still consumes the token and
        // announces them below, but their existing username stands.
        Some(existing) => existing,
        None => {
            let created = Membership::create(
                pool,
                CreateMembership {
                    org_id: org.id,
                    user_id,
                    username: username.to_string(),
                    role: MembershipRole::Member,
                },
            )
            .await
            .map_err(DomainError::from_membership_insert)?;

            Organization::add_member(pool, org.id, user_id).await?;
            created
        }
    };

    let recipients: Vec<Uuid> = Membership::list_profiles(pool, org.id)
        .await?
        .into_iter()
        .map(|m| m.user_id)
        .filter(|id| *id != user_id)
        .collect();

    let mut effects = vec![SideEffect::Audit(AppendEntry {
        org_id: org.id,
        actor_id: user_id,
        action: "joined organization".to_string(),
        target_id: Some(org.id.to_string()),
        target_type: Some("Organization".to_string()),
        details: Some(format!("as {}", membership.username)),
    })];
    if !recipients.is_empty() {
        effects.push(SideEffect::NotifyMembers {
            org_id: org.id,
            recipients,
            kind: NotificationKind::System,
            content: format!("New member joined: {}", membership.username),
            link: None,
        });
    }

    Ok(WorkflowOutcome::with_effects(membership, effects))
}

/// Joins a project by its reusable team code
///
/// Ensures org membership first (deriving a username from the user's
/// display name, suffixed to dodge collisions), then adds the user to the
/// project member list.
pub async fn join_by_team_code(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
) -> DomainResult<WorkflowOutcome<Project>> {
    let project = Project::find_by_invite_code(pool, code)
        .await?
        .ok_or(DomainError::NotFound("team invite"))?;

    let mut effects = Vec::new();

    if Membership::find(pool, project.org_id, user_id).await?.is_none() {
        let user = crate::models::user::User::find_by_id(pool, user_id)
            .await?
            .ok_or(DomainError::NotFound("user"))?;

        let username = format!(
            "{}{}",
            roster::normalized_username(&user.name),
            rand::thread_rng().gen_range(1000..10000)
        );

        Membership::create(
            pool,
            CreateMembership {
                org_id: project.org_id,
                user_id,
                username,
                role: MembershipRole::Member,
            },
        )
        .await
        .map_err(DomainError::from_membership_insert)?;

        Organization::add_member(pool, project.org_id, user_id).await?;

        effects.push(SideEffect::Audit(AppendEntry {
            org_id: project.org_id,
            actor_id: user_id,
            action: "joined team".to_string(),
            target_id: Some(project.id.to_string()),
            target_type: Some("Project".to_string()),
            details: Some(project.name.clone()),
        }));
    }

    Project::add_member(pool, project.id, user_id).await?;

    Ok(WorkflowOutcome::with_effects(project, effects))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_hex_chars() {
        let token = new_invite_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_distinct() {
        assert_ne!(new_invite_token(), new_invite_token());
    }
}
