/// Organization roster and lifecycle
///
/// The member roster has two sources with strict precedence: the
/// memberships table when it has any rows for the org, otherwise the
/// legacy `member_user_ids` list on the organization row. The two are
/// never merged; a partially migrated org reads entirely from whichever
/// source wins.
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::IdentityContext;
use crate::effects::{SideEffect, WorkflowOutcome};
use crate::error::{DomainError, DomainResult};
use crate::models::action_log::AppendEntry;
use crate::models::membership::{CreateMembership, MemberProfile, Membership, MembershipRole};
use crate::models::organization::Organization;
use crate::models::project::{CreateProject, Project};
use crate::models::user::User;

/// Derives an org-scoped username from a display name: whitespace stripped,
/// lowercased
pub fn normalized_username(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Derives a URL slug from an org name plus a numeric suffix for uniqueness
fn derive_slug(name: &str) -> String {
    let base: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    format!("{}-{}", base.trim_matches('-'), rand::thread_rng().gen_range(1000..10000))
}

/// Lists an organization's members
///
/// Membership rows win outright; the legacy list is consulted only when the
/// org has no membership rows at all. Legacy entries get a username derived
/// from the display name and a plain `member` role.
pub async fn list_members(pool: &PgPool, org_id: Uuid) -> DomainResult<Vec<MemberProfile>> {
    let profiles = Membership::list_profiles(pool, org_id).await?;
    if !profiles.is_empty() {
        return Ok(profiles);
    }

    let org = Organization::find_by_id(pool, org_id)
        .await?
        .ok_or(DomainError::OrgNotFound)?;

    if org.member_user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let users = User::find_many(pool, &org.member_user_ids).await?;

    Ok(users
        .into_iter()
        .map(|u| MemberProfile {
            user_id: u.id,
            username: normalized_username(&u.name),
            name: u.name,
            email: u.email,
            avatar_url: u.avatar_url,
            role: "member".to_string(),
            joined_at: u.created_at,
        })
        .collect())
}

/// Creates an organization with its founding member and a default project
///
/// The founder gets the `owner` role and a username derived from their
/// display name. Org names are unique by precheck; the slug carries a
/// random suffix so it never collides.
pub async fn create_organization(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
) -> DomainResult<WorkflowOutcome<Organization>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "organization name must not be empty".into(),
        ));
    }

    if Organization::name_exists(pool, name).await? {
        return Err(DomainError::Validation(
            "organization name already in use".into(),
        ));
    }

    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or(DomainError::NotFound("user"))?;

    let org = Organization::create(pool, name, &derive_slug(name), user_id).await?;

    Membership::create(
        pool,
        CreateMembership {
            org_id: org.id,
            user_id,
            username: normalized_username(&user.name),
            role: MembershipRole::Owner,
        },
    )
    .await
    .map_err(DomainError::from_membership_insert)?;

    Project::create(
        pool,
        CreateProject {
            org_id: org.id,
            name: "General".to_string(),
            key: "GEN".to_string(),
            description: None,
        },
    )
    .await?;

    let effects = vec![SideEffect::Audit(AppendEntry {
        org_id: org.id,
        actor_id: user_id,
        action: "created organization".to_string(),
        target_id: Some(org.id.to_string()),
        target_type: Some("Organization".to_string()),
        details: Some(org.name.clone()),
    })];

    Ok(WorkflowOutcome::with_effects(org, effects))
}

/// Removes the caller from an organization
///
/// Clears both roster sources so the departure holds regardless of which
/// one the org reads from. Assigned tasks are left untouched.
pub async fn leave_organization(
    pool: &PgPool,
    identity: &IdentityContext,
    org_id: Uuid,
) -> DomainResult<WorkflowOutcome<()>> {
    if !Organization::is_member(pool, org_id, identity.user_id).await? {
        return Err(DomainError::Unauthorized);
    }

    Membership::delete(pool, org_id, identity.user_id).await?;
    Organization::remove_member(pool, org_id, identity.user_id).await?;

    let effects = vec![SideEffect::Audit(AppendEntry {
        org_id,
        actor_id: identity.user_id,
        action: "left organization".to_string(),
        target_id: Some(org_id.to_string()),
        target_type: Some("Organization".to_string()),
        details: None,
    })];

    Ok(WorkflowOutcome::with_effects((), effects))
}

/// Lists every organization the user belongs to
pub async fn organizations_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> DomainResult<Vec<Organization>> {
    let orgs = Organization::list_for_user(pool, user_id).await?;
    Ok(orgs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_username() {
        assert_eq!(normalized_username("Ada Lovelace"), "adalovelace");
        assert_eq!(normalized_username("  Grace  Hopper "), "gracehopper");
        assert_eq!(normalized_username("X"), "x");
    }

    #[test]
    fn test_derive_slug_shape() {
        let slug = derive_slug("Acme Corp!");
        let (base, suffix) = slug.rsplit_once('-').unwrap();
        assert_eq!(base, "acme-corp");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
