//! Test utilities shared by the handler and repository tests.

use crate::{
    AppState, Application, BackgroundServices,
    api::models::users::{CurrentUser, Role},
    auth::{
        password::{Argon2Params, hash_password_with_params},
        session,
    },
    config::{Config, ErrorLogConfig, PasswordConfig, PoolSettings},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};
use axum_test::TestServer;
use serde_json::{Value, json};
use sqlx::PgPool;

/// Password given to every user made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "password123";

pub async fn create_test_app(pool: PgPool) -> (TestServer, BackgroundServices) {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> (TestServer, BackgroundServices) {
    let app = Application::new_with_pool(config, Some(pool), None)
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        database: crate::config::DatabaseConfig {
            url: String::new(),
            pool: PoolSettings {
                max_connections: 2,
                min_connections: 0,
                ..Default::default()
            },
        },
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            allow_registration: true,
            password: PasswordConfig {
                argon2_memory_kib: 128,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        seed_dashboard_charts: false,
        error_log: ErrorLogConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn test_state(pool: PgPool, config: Config) -> AppState {
    AppState::builder().db(pool).config(config).build()
}

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_test_user(pool: &PgPool, email: &str, role: Role) -> UserDBResponse {
    let params = Argon2Params::from(&create_test_config().auth.password);
    let password_hash = hash_password_with_params(TEST_PASSWORD, params).expect("Failed to hash password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            nombre: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash,
            role,
        })
        .await
        .expect("Failed to create test user")
}

/// Session token for `user`, signed with the test config's key.
pub fn token_for(user: &UserDBResponse) -> String {
    session::create_session_token(&CurrentUser::from(user.clone()), &create_test_config()).expect("Failed to sign token")
}

pub async fn login_token(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({"email": email, "password": password}))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["token"]
        .as_str()
        .expect("Login response carries a token")
        .to_string()
}

/// An ADMIN user and a token for it.
pub async fn admin_token(pool: &PgPool) -> String {
    token_for(&create_test_user(pool, "admin@example.com", Role::Admin).await)
}

/// A USER-role user and a token for it.
pub async fn user_token(pool: &PgPool) -> String {
    token_for(&create_test_user(pool, "user@example.com", Role::User).await)
}
