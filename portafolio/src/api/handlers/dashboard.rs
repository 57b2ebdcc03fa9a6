use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::dashboard::{CategoryCount, CountsResponse, DATA_TYPES, DataType, RoleCount, StatusCount},
    auth::permissions::{RequiresPermission, operation, resource},
    db::{handlers::DashboardStats, models::dashboard::GroupCount},
    errors::{Error, Result},
};

/// Collapse a grouped count into `(label, count)`, naming the NULL group.
fn labelled(groups: Vec<GroupCount>, null_label: &str) -> impl Iterator<Item = (String, i64)> {
    let null_label = null_label.to_string();
    groups
        .into_iter()
        .map(move |g| (g.label.unwrap_or_else(|| null_label.clone()), g.count))
}

#[utoipa::path(
    get,
    path = "/dashboard/data-types",
    tag = "dashboard",
    summary = "List chartable data types",
    responses((status = 200, description = "Data types", body = [DataType])),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn data_types(_: RequiresPermission<resource::Dashboard, operation::ReadAll>) -> Json<[DataType; 3]> {
    Json(DATA_TYPES)
}

#[utoipa::path(
    get,
    path = "/dashboard/counts",
    tag = "dashboard",
    summary = "Row totals",
    responses((status = 200, description = "Totals", body = CountsResponse)),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn counts(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<CountsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let totals = DashboardStats::new(&mut conn).totals().await?;

    Ok(Json(CountsResponse {
        total_projects: totals.proyectos,
        total_staff: totals.staff,
        total_clients: totals.clientes,
        total_integrations: totals.integraciones,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard/projects-by-category",
    tag = "dashboard",
    summary = "Proyectos per categoria",
    responses((status = 200, description = "Counts per category", body = [CategoryCount])),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn projects_by_category(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<CategoryCount>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let groups = DashboardStats::new(&mut conn).proyectos_by_categoria().await?;

    Ok(Json(
        labelled(groups, "Sin Categoría")
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/dashboard/projects-by-status",
    tag = "dashboard",
    summary = "Proyectos per estado",
    responses((status = 200, description = "Counts per status", body = [StatusCount])),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn projects_by_status(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<StatusCount>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let groups = DashboardStats::new(&mut conn).proyectos_by_estado().await?;

    Ok(Json(
        labelled(groups, "Sin Estado")
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/dashboard/staff-by-role",
    tag = "dashboard",
    summary = "Staff per rol",
    responses((status = 200, description = "Counts per role", body = [RoleCount])),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn staff_by_role(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<RoleCount>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let groups = DashboardStats::new(&mut conn).staff_by_rol().await?;

    Ok(Json(
        labelled(groups, "Sin Rol").map(|(role, count)| RoleCount { role, count }).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, user_token};
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_data_types(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        let body: Value = server.get("/api/dashboard/data-types").authorization_bearer(&token).await.json();
        assert_eq!(body[0], json!({"id": "projects-by-category", "name": "Proyectos por Categoría"}));
        assert_eq!(body[2]["id"], "staff-by-role");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_statistics(pool: PgPool) {
        let (server, _bg) = create_test_app(pool.clone()).await;
        let token = user_token(&pool).await;

        for body in [
            json!({"titulo_proyecto": "A", "categoria": "API", "estado": "Activo"}),
            json!({"titulo_proyecto": "B", "categoria": "API"}),
            json!({"titulo_proyecto": "C"}),
        ] {
            server.post("/api/proyectos").authorization_bearer(&token).json(&body).await;
        }
        server
            .post("/api/staff")
            .authorization_bearer(&token)
            .json(&json!({"nombre_completo": "Ana"}))
            .await;

        let counts: Value = server.get("/api/dashboard/counts").authorization_bearer(&token).await.json();
        assert_eq!(
            counts,
            json!({"totalProjects": 3, "totalStaff": 1, "totalClients": 0, "totalIntegrations": 0})
        );

        let by_category: Value = server
            .get("/api/dashboard/projects-by-category")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(
            by_category,
            json!([{"category": "API", "count": 2}, {"category": "Sin Categoría", "count": 1}])
        );

        let by_status: Value = server
            .get("/api/dashboard/projects-by-status")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(
            by_status,
            json!([{"status": "Sin Estado", "count": 2}, {"status": "Activo", "count": 1}])
        );

        let by_role: Value = server.get("/api/dashboard/staff-by-role").authorization_bearer(&token).await.json();
        assert_eq!(by_role, json!([{"role": "Sin Rol", "count": 1}]));
    }
}
