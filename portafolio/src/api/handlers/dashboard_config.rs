use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        handlers::{not_found, or_not_found},
        models::dashboard::{ChartInput, ChartResponse},
        validation::extract_validated_json,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::handlers::{Charts, Repository, repository::AllRows},
    errors::{Error, Result},
    types::ChartId,
};

const CHART: &str = "Dashboard chart";

#[utoipa::path(
    get,
    path = "/dashboard-config",
    tag = "dashboard-config",
    summary = "List dashboard charts",
    responses((status = 200, description = "Charts ordered by `order`", body = [ChartResponse])),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_charts(
    State(state): State<AppState>,
    _: RequiresPermission<resource::DashboardConfig, operation::ReadAll>,
) -> Result<Json<Vec<ChartResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let charts = Charts::new(&mut conn).list(&AllRows).await?;

    Ok(Json(charts.into_iter().map(ChartResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/dashboard-config",
    tag = "dashboard-config",
    summary = "Create dashboard chart",
    request_body = ChartInput,
    responses(
        (status = 201, description = "Chart created", body = ChartResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_chart(
    State(state): State<AppState>,
    _: RequiresPermission<resource::DashboardConfig, operation::CreateAll>,
    body: std::result::Result<Json<ChartInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ChartResponse>)> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let chart = Charts::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(ChartResponse::from(chart))))
}

#[utoipa::path(
    put,
    path = "/dashboard-config/{id}",
    tag = "dashboard-config",
    summary = "Replace dashboard chart",
    request_body = ChartInput,
    params(("id" = i32, Path, description = "Chart ID")),
    responses(
        (status = 200, description = "Updated chart", body = ChartResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dashboard chart not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_chart(
    State(state): State<AppState>,
    Path(id): Path<ChartId>,
    _: RequiresPermission<resource::DashboardConfig, operation::UpdateAll>,
    body: std::result::Result<Json<ChartInput>, JsonRejection>,
) -> Result<Json<ChartResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let chart = Charts::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(or_not_found(CHART, id))?;

    Ok(Json(ChartResponse::from(chart)))
}

#[utoipa::path(
    delete,
    path = "/dashboard-config/{id}",
    tag = "dashboard-config",
    summary = "Delete dashboard chart",
    params(("id" = i32, Path, description = "Chart ID")),
    responses(
        (status = 204, description = "Chart deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dashboard chart not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_chart(
    State(state): State<AppState>,
    Path(id): Path<ChartId>,
    _: RequiresPermission<resource::DashboardConfig, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Charts::new(&mut conn).delete(id).await? {
        return Err(not_found(CHART, id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{admin_token, create_test_app, create_test_app_with_config, create_test_config, user_token};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_users_read_admins_write(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let user = user_token(&pool).await;
        let admin = admin_token(&pool).await;
        let chart = json!({"title": "Por estado", "chartType": "bar", "dataType": "projects-by-status"});

        server.get("/api/dashboard-config").authorization_bearer(&user).await.assert_status_ok();
        server
            .post("/api/dashboard-config")
            .authorization_bearer(&user)
            .json(&chart)
            .await
            .assert_status_forbidden();
        server
            .post("/api/dashboard-config")
            .authorization_bearer(&admin)
            .json(&chart)
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_chart_lifecycle(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let admin = admin_token(&pool).await;

        for (title, order) in [("Segundo", 5), ("Primero", 1)] {
            server
                .post("/api/dashboard-config")
                .authorization_bearer(&admin)
                .json(&json!({"title": title, "chartType": "line", "dataType": "staff-by-role", "order": order}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let charts: Value = server.get("/api/dashboard-config").authorization_bearer(&admin).await.json();
        assert_eq!(charts[0]["title"], "Primero");
        assert_eq!(charts[1]["title"], "Segundo");
        assert_eq!(charts[0]["enabled"], true);
        let id = charts[1]["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/dashboard-config/{id}"))
            .authorization_bearer(&admin)
            .json(&json!({"title": "Segundo", "chartType": "polarArea", "dataType": "staff-by-role", "enabled": false}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["chartType"], "polarArea");
        assert_eq!(updated["order"], 0);
        assert_eq!(updated["enabled"], false);

        server
            .put(&format!("/api/dashboard-config/{id}"))
            .authorization_bearer(&admin)
            .json(&json!({"title": "X", "chartType": "radar", "dataType": "staff-by-role"}))
            .await
            .assert_status_bad_request();

        server
            .delete(&format!("/api/dashboard-config/{id}"))
            .authorization_bearer(&admin)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let response = server
            .delete(&format!("/api/dashboard-config/{id}"))
            .authorization_bearer(&admin)
            .await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "Dashboard chart not found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_default_charts_seeded_on_startup(pool: PgPool) {
        let mut config = create_test_config();
        config.seed_dashboard_charts = true;
        let (server, _bg) = create_test_app_with_config(pool.clone(), config).await;
        let token = user_token(&pool).await;

        let charts: Value = server.get("/api/dashboard-config").authorization_bearer(&token).await.json();
        let data_types: Vec<&str> = charts
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["dataType"].as_str().unwrap())
            .collect();
        assert_eq!(data_types, vec!["projects-by-category", "staff-by-role", "projects-by-status"]);
        assert_eq!(charts[0]["chartType"], "pie");
    }
}
