/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use worklane_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database_url).await?;
/// let state = AppState::new(pool, config);
/// let app = worklane_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use worklane_shared::auth::session;

use crate::config::Config;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the session secret for token operations
    pub fn session_secret(&self) -> &str {
        &self.config.session_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Health check (public)
/// └── /v1/                              # API v1 (session required)
///     ├── GET    /board                 # Active tasks grouped by column
///     ├── POST   /tasks                 # Create task
///     ├── PATCH  /tasks/:id             # Partial update
///     ├── POST   /tasks/:id/move        # Change column/rank
///     ├── DELETE /tasks/:id             # Move to trash
///     ├── POST   /tasks/:id/restore     # Restore from trash
///     ├── DELETE /tasks/:id/purge       # Remove permanently
///     ├── GET    /trash                 # Soft-deleted tasks
///     ├── GET/POST /tasks/:id/comments  # Task discussion
///     ├── /orgs, /invites               # Membership and invitations
///     ├── /notifications                # Inbox
///     └── GET    /logs                  # Audit log (capped)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Session authentication (everything under /v1)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let task_routes = Router::new()
        .route("/board", get(routes::tasks::board))
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/:id", patch(routes::tasks::update_task))
        .route("/tasks/:id", delete(routes::tasks::delete_task))
        .route("/tasks/:id/move", post(routes::tasks::move_task))
        .route("/tasks/:id/restore", post(routes::tasks::restore_task))
        .route("/tasks/:id/purge", delete(routes::tasks::purge_task))
        .route("/trash", get(routes::tasks::list_trash))
        .route(
            "/tasks/:id/comments",
            get(routes::comments::list_comments).post(routes::comments::add_comment),
        );

    let org_routes = Router::new()
        .route("/orgs", post(routes::orgs::create_org))
        .route("/orgs", get(routes::orgs::list_orgs))
        .route("/orgs/:id/members", get(routes::orgs::list_members))
        .route("/orgs/:id/leave", post(routes::orgs::leave_org))
        .route("/orgs/:id/switch", post(routes::orgs::switch_org))
        .route("/orgs/:id/invites", post(routes::invites::create_invite))
        .route("/invites/redeem", post(routes::invites::redeem_invite))
        .route(
            "/invites/team/:code/join",
            post(routes::invites::join_by_team_code),
        );

    let inbox_routes = Router::new()
        .route(
            "/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/notifications/:id/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        .route("/logs", get(routes::logs::list_logs));

    // Everything under /v1 requires a valid session
    let v1_routes = Router::new()
        .merge(task_routes)
        .merge(org_routes)
        .merge(inbox_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Extracts and validates the session token from the Authorization header,
/// then injects the decoded `IdentityContext` into request extensions.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let identity = session::validate_session_token(token, state.session_secret())?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
