/// Domain error taxonomy
///
/// Every fallible engine operation returns `Result<T, DomainError>`. The
/// variants up to `Validation` are expected business outcomes that the API
/// layer maps to specific status codes; `Database` covers everything
/// unexpected and surfaces as a generic internal failure.
///
/// Storage-level races surface as domain errors here rather than as internal
/// faults: a unique-constraint violation on `(org_id, username)` is the
/// expected `UsernameTaken` outcome of a redemption race, not a bug.
use thiserror::Error;

/// Result alias used throughout the shared crate
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// No identity context was supplied with the request
    #[error("authentication required")]
    Unauthenticated,

    /// Caller is not a member of the target organization
    #[error("not authorized for this organization")]
    Unauthorized,

    /// A referenced org/project/task/invitation does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Invitation resolved, but its organization is gone
    #[error("organization not found")]
    OrgNotFound,

    /// Invite token missing, already accepted, or lost a redemption race
    #[error("invalid or expired invite")]
    InvalidInvite,

    /// Desired username already held within the organization
    #[error("username already taken in this organization")]
    UsernameTaken,

    /// Caller-supplied input failed validation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unexpected storage failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    /// Maps a sqlx error in the context of a membership insert.
    ///
    /// The compound unique index on `(org_id, username)` is the actual
    /// concurrency guard for invite redemption; hitting it means the
    /// username was claimed by a concurrent writer.
    pub fn from_membership_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("username") {
                    return DomainError::UsernameTaken;
                }
            }
        }
        DomainError::Database(err)
    }

    /// True for variants that represent expected business outcomes rather
    /// than operational failures.
    pub fn is_domain(&self) -> bool {
        !matches!(self, DomainError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DomainError::UsernameTaken.to_string(),
            "username already taken in this organization"
        );
        assert_eq!(
            DomainError::NotFound("project").to_string(),
            "project not found"
        );
        assert_eq!(
            DomainError::InvalidInvite.to_string(),
            "invalid or expired invite"
        );
    }

    #[test]
    fn test_row_not_found_stays_database() {
        // RowNotFound is mapped to NotFound at call sites that know what was
        // being looked up, not blanket-converted here.
        let err = DomainError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_domain());
    }

    #[test]
    fn test_is_domain() {
        assert!(DomainError::Unauthenticated.is_domain());
        assert!(DomainError::UsernameTaken.is_domain());
        assert!(!DomainError::Database(sqlx::Error::PoolClosed).is_domain());
    }
}
