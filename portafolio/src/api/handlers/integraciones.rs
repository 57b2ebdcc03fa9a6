use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        handlers::{not_found, or_not_found},
        models::integraciones::{IntegracionInput, IntegracionResponse, IntegracionesListResponse, ListIntegracionesQuery},
        validation::extract_validated_json,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::handlers::{Integraciones, Repository, integraciones::IntegracionFilter},
    errors::{Error, Result},
    types::IntegracionId,
};

const INTEGRACION: &str = "Integration";

#[utoipa::path(
    get,
    path = "/integraciones",
    tag = "integraciones",
    summary = "List integraciones",
    params(ListIntegracionesQuery),
    responses(
        (status = 200, description = "Page of integraciones", body = IntegracionesListResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_integraciones(
    State(state): State<AppState>,
    Query(query): Query<ListIntegracionesQuery>,
    _: RequiresPermission<resource::Integraciones, operation::ReadAll>,
) -> Result<Json<IntegracionesListResponse>> {
    let (skip, limit) = query.pagination.params();
    let filter = IntegracionFilter::new(skip, limit).with_search(query.search);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Integraciones::new(&mut conn);
    let integraciones = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(IntegracionesListResponse {
        integraciones: integraciones.into_iter().map(IntegracionResponse::from).collect(),
        total_count,
    }))
}

#[utoipa::path(
    post,
    path = "/integraciones",
    tag = "integraciones",
    summary = "Create integracion",
    request_body = IntegracionInput,
    responses(
        (status = 201, description = "Integracion created", body = IntegracionResponse),
        (status = 400, description = "Invalid request"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_integracion(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Integraciones, operation::CreateAll>,
    body: std::result::Result<Json<IntegracionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<IntegracionResponse>)> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let integracion = Integraciones::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(IntegracionResponse::from(integracion))))
}

#[utoipa::path(
    get,
    path = "/integraciones/{id}",
    tag = "integraciones",
    summary = "Get integracion",
    params(("id" = i32, Path, description = "Integracion ID")),
    responses(
        (status = 200, description = "Integracion", body = IntegracionResponse),
        (status = 404, description = "Integration not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_integracion(
    State(state): State<AppState>,
    Path(id): Path<IntegracionId>,
    _: RequiresPermission<resource::Integraciones, operation::ReadAll>,
) -> Result<Json<IntegracionResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let integracion = Integraciones::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(INTEGRACION, id))?;

    Ok(Json(IntegracionResponse::from(integracion)))
}

#[utoipa::path(
    put,
    path = "/integraciones/{id}",
    tag = "integraciones",
    summary = "Update integracion",
    request_body = IntegracionInput,
    params(("id" = i32, Path, description = "Integracion ID")),
    responses(
        (status = 200, description = "Updated integracion", body = IntegracionResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Integration not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_integracion(
    State(state): State<AppState>,
    Path(id): Path<IntegracionId>,
    _: RequiresPermission<resource::Integraciones, operation::UpdateAll>,
    body: std::result::Result<Json<IntegracionInput>, JsonRejection>,
) -> Result<Json<IntegracionResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let integracion = Integraciones::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(or_not_found(INTEGRACION, id))?;

    Ok(Json(IntegracionResponse::from(integracion)))
}

#[utoipa::path(
    delete,
    path = "/integraciones/{id}",
    tag = "integraciones",
    summary = "Delete integracion",
    params(("id" = i32, Path, description = "Integracion ID")),
    responses(
        (status = 204, description = "Integracion deleted"),
        (status = 404, description = "Integration not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_integracion(
    State(state): State<AppState>,
    Path(id): Path<IntegracionId>,
    _: RequiresPermission<resource::Integraciones, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Integraciones::new(&mut conn).delete(id).await? {
        return Err(not_found(INTEGRACION, id));
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
    async fn test_search_treats_wildcards_literally(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        for (nombre, detalles) in [("SSO", "Login"), ("Pagos", "Cobros"), ("Firma_Digital", "100% online")] {
            server
                .post("/api/integraciones")
                .authorization_bearer(&token)
                .json(&json!({"nombre": nombre, "detalles": detalles}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let page: Value = server.get("/api/integraciones?search=_").authorization_bearer(&token).await.json();
        assert_eq!(page["totalCount"], 1);
        assert_eq!(page["integraciones"][0]["nombre"], "Firma_Digital");

        let page: Value = server
            .get("/api/integraciones?search=%25")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(page["totalCount"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_integraciones_crud(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        let response = server
            .post("/api/integraciones")
            .authorization_bearer(&token)
            .json(&json!({"nombre": "Mi Argentina", "detalles": "Login ciudadano"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        server
            .post("/api/integraciones")
            .authorization_bearer(&token)
            .json(&json!({"nombre": "AFIP"}))
            .await
            .assert_status_bad_request();

        let page: Value = server
            .get("/api/integraciones?search=ciudadano")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(page["totalCount"], 1);
        assert_eq!(page["integraciones"][0]["nombre"], "Mi Argentina");

        let response = server
            .put(&format!("/api/integraciones/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"nombre": "Mi Argentina", "detalles": "SSO"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["detalles"], "SSO");

        server
            .delete(&format!("/api/integraciones/{id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let response = server
            .put(&format!("/api/integraciones/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"nombre": "X", "detalles": "Y"}))
            .await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "Integration not found");
    }
}
