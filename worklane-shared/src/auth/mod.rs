//! Identity context and session tokens
//!
//! Credentials, password hashing, and login flows live outside this core;
//! the only thing it understands is the `(user, organization)` identity a
//! session token yields.

pub mod session;

pub use session::{IdentityContext, SessionClaims, SessionError};
