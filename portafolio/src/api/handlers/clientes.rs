use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        handlers::{not_found, or_not_found},
        models::clientes::{ClienteInput, ClienteResponse},
        validation::extract_validated_json,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::handlers::{Clientes, Repository, repository::AllRows},
    errors::{Error, Result},
    types::ClienteId,
};

const CLIENTE: &str = "Cliente";

#[utoipa::path(
    get,
    path = "/clientes",
    tag = "clientes",
    summary = "List clientes",
    responses(
        (status = 200, description = "Every cliente, ordered by id", body = [ClienteResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_clientes(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Clientes, operation::ReadAll>,
) -> Result<Json<Vec<ClienteResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let clientes = Clientes::new(&mut conn).list(&AllRows).await?;

    Ok(Json(clientes.into_iter().map(ClienteResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/clientes",
    tag = "clientes",
    summary = "Create cliente",
    request_body = ClienteInput,
    responses(
        (status = 201, description = "Cliente created", body = ClienteResponse),
        (status = 400, description = "Invalid request"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_cliente(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Clientes, operation::CreateAll>,
    body: std::result::Result<Json<ClienteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ClienteResponse>)> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cliente = Clientes::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(ClienteResponse::from(cliente))))
}

#[utoipa::path(
    get,
    path = "/clientes/{id}",
    tag = "clientes",
    summary = "Get cliente",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Cliente", body = ClienteResponse),
        (status = 404, description = "Cliente not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_cliente(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
    _: RequiresPermission<resource::Clientes, operation::ReadAll>,
) -> Result<Json<ClienteResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cliente = Clientes::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(CLIENTE, id))?;

    Ok(Json(ClienteResponse::from(cliente)))
}

#[utoipa::path(
    put,
    path = "/clientes/{id}",
    tag = "clientes",
    summary = "Update cliente",
    request_body = ClienteInput,
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Updated cliente", body = ClienteResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Cliente not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_cliente(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
    _: RequiresPermission<resource::Clientes, operation::UpdateAll>,
    body: std::result::Result<Json<ClienteInput>, JsonRejection>,
) -> Result<Json<ClienteResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cliente = Clientes::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(or_not_found(CLIENTE, id))?;

    Ok(Json(ClienteResponse::from(cliente)))
}

#[utoipa::path(
    delete,
    path = "/clientes/{id}",
    tag = "clientes",
    summary = "Delete cliente",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 204, description = "Cliente deleted"),
        (status = 404, description = "Cliente not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_cliente(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
    _: RequiresPermission<resource::Clientes, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Clientes::new(&mut conn).delete(id).await? {
        return Err(not_found(CLIENTE, id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, user_token};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_clientes_crud(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        let response = server
            .post("/api/clientes")
            .authorization_bearer(&token)
            .json(&json!({
                "cliente": "Secretaría de Salud",
                "mail_cliente": "salud@example.com",
                "fecha_inicio_desarrollo": "2024-05-01",
                "estado": "En_Desarrollo"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["estado"], "En_Desarrollo");
        assert!(created["fecha_inicio_desarrollo"].as_str().unwrap().starts_with("2024-05-01T00:00:00"));
        let id = created["id"].as_i64().unwrap();

        server
            .post("/api/clientes")
            .authorization_bearer(&token)
            .json(&json!({"cliente": "Otro"}))
            .await
            .assert_status(StatusCode::CREATED);

        let all: Value = server.get("/api/clientes").authorization_bearer(&token).await.json();
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[0]["id"].as_i64().unwrap(), id);

        let response = server
            .put(&format!("/api/clientes/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"mail_cliente": null, "tipo": "Externo"}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert!(updated["mail_cliente"].is_null());
        assert_eq!(updated["cliente"], "Secretaría de Salud");

        server
            .delete(&format!("/api/clientes/{id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let response = server.get(&format!("/api/clientes/{id}")).authorization_bearer(&token).await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "Cliente not found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_clientes_validation(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        for body in [
            json!({"mail_cliente": "sin-arroba"}),
            json!({"fecha_inicio_desarrollo": "ayer"}),
            json!({"estado": "Cerrado"}),
        ] {
            server
                .post("/api/clientes")
                .authorization_bearer(&token)
                .json(&body)
                .await
                .assert_status_bad_request();
        }
    }
}
