use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        handlers::{not_found, or_not_found},
        models::tecnologias::{TecnologiasInput, TecnologiasResponse},
        validation::extract_validated_json,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::handlers::{Repository, Tecnologias, repository::AllRows},
    errors::{Error, Result},
    types::TecnologiasId,
};

const TECNOLOGIAS: &str = "Tecnologias entry";

#[utoipa::path(
    get,
    path = "/tecnologias",
    tag = "tecnologias",
    summary = "List technology profiles",
    responses(
        (status = 200, description = "Every profile, ordered by id", body = [TecnologiasResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_tecnologias(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Tecnologias, operation::ReadAll>,
) -> Result<Json<Vec<TecnologiasResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = Tecnologias::new(&mut conn).list(&AllRows).await?;

    Ok(Json(rows.into_iter().map(TecnologiasResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/tecnologias",
    tag = "tecnologias",
    summary = "Create technology profile",
    request_body = TecnologiasInput,
    responses(
        (status = 201, description = "Profile created", body = TecnologiasResponse),
        (status = 400, description = "Invalid request or unknown proyecto_id"),
        (status = 409, description = "The proyecto already has a profile"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_tecnologias(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Tecnologias, operation::CreateAll>,
    body: std::result::Result<Json<TecnologiasInput>, JsonRejection>,
) -> Result<(StatusCode, Json<TecnologiasResponse>)> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = Tecnologias::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(TecnologiasResponse::from(row))))
}

#[utoipa::path(
    get,
    path = "/tecnologias/{id}",
    tag = "tecnologias",
    summary = "Get technology profile",
    params(("id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile", body = TecnologiasResponse),
        (status = 404, description = "Tecnologias entry not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_tecnologias(
    State(state): State<AppState>,
    Path(id): Path<TecnologiasId>,
    _: RequiresPermission<resource::Tecnologias, operation::ReadAll>,
) -> Result<Json<TecnologiasResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = Tecnologias::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(TECNOLOGIAS, id))?;

    Ok(Json(TecnologiasResponse::from(row)))
}

#[utoipa::path(
    put,
    path = "/tecnologias/{id}",
    tag = "tecnologias",
    summary = "Update technology profile",
    request_body = TecnologiasInput,
    params(("id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Updated profile", body = TecnologiasResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Tecnologias entry not found"),
        (status = 409, description = "The proyecto already has a profile"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_tecnologias(
    State(state): State<AppState>,
    Path(id): Path<TecnologiasId>,
    _: RequiresPermission<resource::Tecnologias, operation::UpdateAll>,
    body: std::result::Result<Json<TecnologiasInput>, JsonRejection>,
) -> Result<Json<TecnologiasResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = Tecnologias::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(or_not_found(TECNOLOGIAS, id))?;

    Ok(Json(TecnologiasResponse::from(row)))
}

#[utoipa::path(
    delete,
    path = "/tecnologias/{id}",
    tag = "tecnologias",
    summary = "Delete technology profile",
    params(("id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 404, description = "Tecnologias entry not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_tecnologias(
    State(state): State<AppState>,
    Path(id): Path<TecnologiasId>,
    _: RequiresPermission<resource::Tecnologias, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Tecnologias::new(&mut conn).delete(id).await? {
        return Err(not_found(TECNOLOGIAS, id));
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
    async fn test_tecnologias_crud(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        let proyecto: Value = server
            .post("/api/proyectos")
            .authorization_bearer(&token)
            .json(&json!({"titulo_proyecto": "Turnos"}))
            .await
            .json();
        let proyecto_id = proyecto["id"].as_i64().unwrap();

        let response = server
            .post("/api/tecnologias")
            .authorization_bearer(&token)
            .json(&json!({"proyecto_id": proyecto_id, "lenguaje_desarrollo": "PHP", "ano_inicio_sistema": 2019}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = server
            .post("/api/tecnologias")
            .authorization_bearer(&token)
            .json(&json!({"proyecto_id": proyecto_id}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["field"], "proyecto_id");

        server
            .post("/api/tecnologias")
            .authorization_bearer(&token)
            .json(&json!({"proyecto_id": 9999}))
            .await
            .assert_status_bad_request();
        server
            .post("/api/tecnologias")
            .authorization_bearer(&token)
            .json(&json!({"lenguaje_desarrollo": "Go"}))
            .await
            .assert_status_bad_request();

        let response = server
            .put(&format!("/api/tecnologias/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"proyecto_id": proyecto_id, "base_datos": "PostgreSQL"}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["base_datos"], "PostgreSQL");
        assert_eq!(updated["lenguaje_desarrollo"], "PHP");

        let all: Value = server.get("/api/tecnologias").authorization_bearer(&token).await.json();
        assert_eq!(all.as_array().unwrap().len(), 1);

        server
            .delete(&format!("/api/tecnologias/{id}"))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let response = server.get(&format!("/api/tecnologias/{id}")).authorization_bearer(&token).await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "Tecnologias entry not found");
    }
}
