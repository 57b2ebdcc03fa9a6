use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    AppState,
    api::{
        models::{
            auth::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse},
            users::CurrentUser,
        },
        validation::extract_validated_json,
    },
    auth::{
        password::{self, Argon2Params},
        session,
    },
    db::{errors::DbError, handlers::Users},
    errors::{Error, Result},
};

/// Register a new user account. The very first account becomes SUPERADMIN.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input or registration disabled"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let request = extract_validated_json(body)?;

    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "Registration is disabled.".to_string(),
        });
    }

    // Presence was checked by validation
    let nombre = request.nombre.unwrap_or_default().trim().to_string();
    let email = request.email.unwrap_or_default().trim().to_string();
    let plain = request.password.unwrap_or_default();

    password::check_length(&plain, &state.config.auth.password)?;
    let password_hash = password::hash_password(plain, Argon2Params::from(&state.config.auth.password)).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .register(&nombre, &email, &password_hash)
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => Error::Conflict {
                message: "Email already registered.".to_string(),
                field: Some("email".to_string()),
            },
            other => Error::Database(other),
        })?;

    tracing::info!(user_id = user.id, role = ?user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Exchange email and password for a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let request = extract_validated_json(body)?;
    let email = request.email.unwrap_or_default();
    let plain = request.password.unwrap_or_default();

    let invalid = || Error::Unauthenticated {
        message: Some("Invalid credentials.".to_string()),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_user_by_email(email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password_blocking(plain, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let current_user = CurrentUser::from(user);
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: current_user.id,
            nombre: current_user.nombre,
            email: current_user.email,
            role: current_user.role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, login_token};
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_first_user_is_superadmin(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;

        let response = server
            .post("/api/auth/register")
            .json(&json!({"nombre": "Primera", "email": "primera@example.com", "password": "password123"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "User registered successfully");
        assert!(body["userId"].is_i64());

        let response = server
            .post("/api/auth/login")
            .json(&json!({"email": "primera@example.com", "password": "password123"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["user"]["role"], "SUPERADMIN");
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

        server
            .post("/api/auth/register")
            .json(&json!({"nombre": "Segunda", "email": "segunda@example.com", "password": "password123"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        let token = login_token(&server, "segunda@example.com", "password123").await;
        assert!(!token.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_validation(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;

        let response = server
            .post("/api/auth/register")
            .json(&json!({"email": "x@example.com", "password": "password123"}))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "All fields are required.");

        let response = server
            .post("/api/auth/register")
            .json(&json!({"nombre": "Corta", "email": "corta@example.com", "password": "123"}))
            .await;
        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;
        let body = json!({"nombre": "Ana", "email": "ana@example.com", "password": "password123"});

        server.post("/api/auth/register").json(&body).await.assert_status(axum::http::StatusCode::CREATED);
        let response = server.post("/api/auth/register").json(&body).await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "Email already registered.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_failures(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;
        server
            .post("/api/auth/register")
            .json(&json!({"nombre": "Ana", "email": "ana@example.com", "password": "password123"}))
            .await;

        let response = server.post("/api/auth/login").json(&json!({"email": "ana@example.com"})).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "Email and password are required.");

        let response = server
            .post("/api/auth/login")
            .json(&json!({"email": "ana@example.com", "password": "incorrecta"}))
            .await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["error"], "Invalid credentials.");

        let response = server
            .post("/api/auth/login")
            .json(&json!({"email": "nadie@example.com", "password": "password123"}))
            .await;
        response.assert_status_unauthorized();
    }
}
