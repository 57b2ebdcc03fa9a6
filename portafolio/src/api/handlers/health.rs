use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Liveness check",
    responses((status = 200, description = "Server is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_health_needs_no_token(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"status": "OK", "message": "Server is running"})
        );

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }
}
