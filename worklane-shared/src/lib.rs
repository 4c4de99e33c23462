//! # Worklane Shared Library
//!
//! Models, storage layer, and the workflow/membership engines behind the
//! Worklane API server. All business logic lives here; the API crate is a
//! thin presentation adapter on top.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `workflow`: Task lifecycle engine (create, update, move, trash, purge)
//! - `sequence`: Gapless per-project task number allocation
//! - `invites`: Invite token generation and redemption, team-code joins
//! - `roster`: Organization lifecycle and member listing
//! - `mentions`: @mention / #hashtag extraction and notification fan-out
//! - `audit`: Capped, paginated action log
//! - `effects`: Side-effect intents and their best-effort dispatcher
//! - `auth`: Session tokens and the identity context
//! - `db`: Connection pool and migrations
//! - `error`: Common error types

pub mod audit;
pub mod auth;
pub mod db;
pub mod effects;
pub mod error;
pub mod invites;
pub mod mentions;
pub mod models;
pub mod roster;
pub mod sequence;
pub mod workflow;

/// Current version of the Worklane shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
