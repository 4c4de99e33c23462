/// Session token handling
///
/// Sessions are HS256-signed JWTs carrying the caller's user ID (`sub`) and
/// current organization (`org_id`). Every engine operation takes the decoded
/// [`IdentityContext`]; this module is the only place tokens are minted or
/// validated.
///
/// # Example
///
/// ```
/// use worklane_shared::auth::session::{create_session_token, validate_session_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_session_token(Uuid::new_v4(), Uuid::new_v4(), secret)?;
/// let identity = validate_session_token(&token, secret)?;
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::organization::Organization;

/// Session lifetime communicated to clients
const SESSION_HOURS: i64 = 24;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,

    /// Token failed signature or structural validation
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// The identity every engine operation runs under
///
/// Produced externally (by validating a session token); the engines never
/// look at credentials, only at this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityContext {
    /// Acting user
    pub user_id: Uuid,

    /// Organization scope of the session
    pub org_id: Uuid,
}

/// JWT claims for a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "worklane"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Organization scope (custom claim)
    pub org_id: Uuid,
}

impl SessionClaims {
    /// Creates claims for a 24-hour session scoped to one organization
    pub fn new(user_id: Uuid, org_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iss: "worklane".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_HOURS)).timestamp(),
            org_id,
        }
    }

    /// The identity this session yields
    pub fn identity(&self) -> IdentityContext {
        IdentityContext {
            user_id: self.sub,
            org_id: self.org_id,
        }
    }
}

/// Signs a session token for the given identity
pub fn create_session_token(
    user_id: Uuid,
    org_id: Uuid,
    secret: &str,
) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &SessionClaims::new(user_id, org_id), &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts the identity it carries
///
/// Verifies signature, expiry, and issuer.
pub fn validate_session_token(token: &str, secret: &str) -> Result<IdentityContext, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["worklane"]);
    validation.validate_exp = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind()
    {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims.identity())
}

/// Re-scopes a session to another organization the caller belongs to
///
/// Verifies membership in the target organization, then mints a fresh token
/// carrying the same user with the new org scope. Fails `Unauthorized` when
/// the caller is not a member.
pub async fn switch_organization(
    pool: &PgPool,
    identity: &IdentityContext,
    target_org_id: Uuid,
    secret: &str,
) -> DomainResult<String> {
    if !Organization::is_member(pool, target_org_id, identity.user_id).await? {
        return Err(DomainError::Unauthorized);
    }

    create_session_token(identity.user_id, target_org_id, secret)
        .map_err(|e| DomainError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_session_round_trip() {
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();

        let token = create_session_token(user_id, org_id, SECRET).unwrap();
        let identity = validate_session_token(&token, SECRET).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.org_id, org_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_session_token(Uuid::new_v4(), Uuid::new_v4(), SECRET).unwrap();
        let result = validate_session_token(&token, "another-secret-also-32-bytes-long!!");
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_session_token("not-a-jwt", SECRET);
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_claims_identity() {
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();
        let claims = SessionClaims::new(user_id, org_id);

        assert_eq!(claims.iss, "worklane");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.identity().user_id, user_id);
        assert_eq!(claims.identity().org_id, org_id);
    }
}
