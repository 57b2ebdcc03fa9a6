use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        handlers::or_not_found,
        models::users::{ListUsersQuery, Role, UserCreate, UserResponse, UserUpdate, UsersListResponse},
        validation::extract_validated_json,
    },
    auth::{
        password::{self, Argon2Params},
        permissions::{RequiresPermission, check_super_admin, operation, resource},
    },
    db::{
        errors::DbError,
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, Permission, Resource, UserId},
};

/// Email conflicts get a message of their own instead of the generic 409.
fn email_conflict(message: &'static str) -> impl FnOnce(DbError) -> Error {
    move |e| match e {
        DbError::UniqueViolation { .. } => Error::Conflict {
            message: message.to_string(),
            field: Some("email".to_string()),
        },
        other => Error::Database(other),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = UsersListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    _: RequiresPermission<resource::Users, operation::ReadAll>,
) -> Result<Json<UsersListResponse>> {
    let (skip, limit) = query.pagination.params();
    let filter = UserFilter::new(skip, limit).with_search(query.search);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);
    let users = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(UsersListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total_count,
    }))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::CreateAll>,
    body: std::result::Result<Json<UserCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let request = extract_validated_json(body)?;
    password::check_length(&request.password, &state.config.auth.password)?;
    let password_hash = password::hash_password(request.password, Argon2Params::from(&state.config.auth.password)).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            nombre: request.nombre.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(email_conflict("Email already registered."))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    _: RequiresPermission<resource::Users, operation::ReadAll>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| super::not_found("User", id))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    summary = "Update user",
    request_body = UserUpdate,
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: RequiresPermission<resource::Users, operation::UpdateAll>,
    body: std::result::Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let request = extract_validated_json(body)?;

    if request.role.is_some() && !check_super_admin(&current_user) {
        return Err(Error::InsufficientPermissions {
            required: Permission::Allow(Resource::Users, Operation::UpdateAll),
            action: Operation::UpdateAll,
            resource: "user roles".to_string(),
        });
    }

    let password_hash = match request.password {
        Some(plain) => {
            password::check_length(&plain, &state.config.auth.password)?;
            Some(password::hash_password(plain, Argon2Params::from(&state.config.auth.password)).await?)
        }
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .update(
            id,
            &UserUpdateDBRequest {
                nombre: request.nombre.map(|n| n.trim().to_string()),
                email: request.email.map(|e| e.trim().to_string()),
                password_hash,
                role: request.role,
            },
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound => super::not_found("User", id),
            other => email_conflict("Email already in use.")(other),
        })?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    _: RequiresPermission<resource::Users, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Users::new(&mut conn).delete(id).await.map_err(or_not_found("User", id))? {
        return Err(super::not_found("User", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_user, token_for};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_users_require_admin(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "user@example.com", Role::User).await;

        server.get("/api/users").await.assert_status_unauthorized();
        server
            .get("/api/users")
            .authorization_bearer(token_for(&user))
            .await
            .assert_status_forbidden();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_crud(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", Role::Admin).await;
        let token = token_for(&admin);

        let response = server
            .post("/api/users")
            .authorization_bearer(&token)
            .json(&json!({"nombre": "Nuevo", "email": "nuevo@example.com", "password": "password123"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["role"], "USER");
        let id = created["id"].as_i64().unwrap();

        let response = server
            .post("/api/users")
            .authorization_bearer(&token)
            .json(&json!({"nombre": "Otro", "email": "nuevo@example.com", "password": "password123"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "Email already registered.");

        let response = server
            .put(&format!("/api/users/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"email": "admin@example.com"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "Email already in use.");

        let response = server
            .put(&format!("/api/users/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"nombre": "Renombrado"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["nombre"], "Renombrado");

        let response = server.get("/api/users?search=renomb").authorization_bearer(&token).await;
        let page: Value = response.json();
        assert_eq!(page["totalCount"], 1);
        assert_eq!(page["users"][0]["id"], id);

        // Only a SUPERADMIN may delete or change roles
        server
            .delete(&format!("/api/users/{id}"))
            .authorization_bearer(&token)
            .await
            .assert_status_forbidden();
        server
            .put(&format!("/api/users/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"role": "ADMIN"}))
            .await
            .assert_status_forbidden();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_superadmin_delete_and_not_found(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let root = create_test_user(&pool, "root@example.com", Role::Superadmin).await;
        let victim = create_test_user(&pool, "victim@example.com", Role::User).await;
        let token = token_for(&root);

        let response = server
            .put(&format!("/api/users/{}", victim.id))
            .authorization_bearer(&token)
            .json(&json!({"role": "ADMIN"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["role"], "ADMIN");

        server
            .delete(&format!("/api/users/{}", victim.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get(&format!("/api/users/{}", victim.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "User not found");

        server
            .delete(&format!("/api/users/{}", victim.id))
            .authorization_bearer(&token)
            .await
            .assert_status_not_found();
    }
}
