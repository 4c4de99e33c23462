/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Board, task lifecycle, and trash endpoints
/// - `comments`: Task discussion endpoints
/// - `orgs`: Organization lifecycle and roster endpoints
/// - `invites`: Invite generation, redemption, and team-code joins
/// - `notifications`: Inbox endpoints
/// - `logs`: Audit log endpoint

pub mod comments;
pub mod health;
pub mod invites;
pub mod logs;
pub mod notifications;
pub mod orgs;
pub mod tasks;
