//! Database models
//!
//! One module per entity. Each model is a `sqlx::FromRow` struct with
//! associated async query functions taking a `&PgPool`, raw SQL, and
//! explicit column lists.

pub mod action_log;
pub mod comment;
pub mod invitation;
pub mod membership;
pub mod notification;
pub mod organization;
pub mod project;
pub mod task;
pub mod user;
