/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (skipped when DATABASE_URL is unset)
/// - Test user/organization creation
/// - Session token generation
/// - Router construction
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

use worklane_api::app::{build_router, AppState};
use worklane_api::config::Config;
use worklane_shared::auth::session::create_session_token;
use worklane_shared::models::organization::Organization;
use worklane_shared::models::user::{CreateUser, User};
use worklane_shared::roster;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub org: Organization,
    pub token: String,
}

impl TestContext {
    /// Creates a test context with a fresh user and organization, or None
    /// when no database is configured
    pub async fn new() -> Option<Self> {
        let url = env::var("DATABASE_URL").ok()?;

        let db = PgPool::connect(&url).await.expect("Failed to connect");

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../worklane-shared/migrations")
            .run(&db)
            .await
            .expect("Migrations failed");

        let user = User::create(
            &db,
            CreateUser {
                name: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                avatar_url: None,
            },
        )
        .await
        .expect("Failed to create user");

        let org = roster::create_organization(&db, user.id, &format!("Test Org {}", Uuid::new_v4()))
            .await
            .expect("Failed to create org")
            .value;

        let token =
            create_session_token(user.id, org.id, TEST_SECRET).expect("Failed to mint token");

        let state = AppState::new(db.clone(), test_config(url));
        let app = build_router(state);

        Some(Self {
            db,
            app,
            user,
            org,
            token,
        })
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// A config for tests that never reads the environment
pub fn test_config(database_url: String) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url,
        database_max_connections: 5,
        session_secret: TEST_SECRET.to_string(),
    }
}
