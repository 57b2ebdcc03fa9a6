//! Database repository for dashboard chart configuration.

use crate::types::ChartId;
use crate::{
    api::models::dashboard::ChartInput,
    db::{
        errors::{DbError, Result},
        handlers::repository::{AllRows, Repository},
        models::dashboard::ChartDBResponse,
    },
};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

pub struct Charts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Charts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert each chart whose `data_type` is not configured yet. Returns how
    /// many were inserted.
    #[instrument(skip(self, defaults), fields(count = defaults.len()), err)]
    pub async fn seed(&mut self, defaults: &[ChartInput]) -> Result<usize> {
        let mut inserted = 0;
        for chart in defaults {
            let result = sqlx::query(
                r#"
                INSERT INTO dashboard_charts (title, chart_type, data_type, options, chart_order, enabled)
                SELECT $1, $2, $3, $4, $5, $6
                WHERE NOT EXISTS (SELECT 1 FROM dashboard_charts WHERE data_type = $3)
                "#,
            )
            .bind(&chart.title)
            .bind(chart.chart_type)
            .bind(&chart.data_type)
            .bind(&chart.options)
            .bind(chart.order)
            .bind(chart.enabled)
            .execute(&mut *self.db)
            .await?;
            inserted += result.rows_affected() as usize;
        }
        Ok(inserted)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Charts<'c> {
    type CreateRequest = ChartInput;
    type UpdateRequest = ChartInput;
    type Response = ChartDBResponse;
    type Id = ChartId;
    type Filter = AllRows;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let chart = sqlx::query_as::<_, ChartDBResponse>(
            r#"
            INSERT INTO dashboard_charts (title, chart_type, data_type, options, chart_order, enabled)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.title.trim())
        .bind(request.chart_type)
        .bind(request.data_type.trim())
        .bind(&request.options)
        .bind(request.order)
        .bind(request.enabled)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(chart)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let chart = sqlx::query_as::<_, ChartDBResponse>("SELECT * FROM dashboard_charts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(chart)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<ChartId>) -> Result<HashMap<Self::Id, ChartDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let charts = sqlx::query_as::<_, ChartDBResponse>("SELECT * FROM dashboard_charts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(charts.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let charts = sqlx::query_as::<_, ChartDBResponse>("SELECT * FROM dashboard_charts ORDER BY chart_order, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(charts)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dashboard_charts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let chart = sqlx::query_as::<_, ChartDBResponse>(
            r#"
            UPDATE dashboard_charts SET
                title = $2,
                chart_type = $3,
                data_type = $4,
                options = $5,
                chart_order = $6,
                enabled = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.title.trim())
        .bind(request.chart_type)
        .bind(request.data_type.trim())
        .bind(&request.options)
        .bind(request.order)
        .bind(request.enabled)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::enums::ChartType;
    use sqlx::PgPool;

    fn chart(title: &str, data_type: &str, order: i32) -> ChartInput {
        ChartInput {
            title: title.to_string(),
            chart_type: ChartType::Bar,
            data_type: data_type.to_string(),
            options: None,
            order,
            enabled: true,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_is_ordered_by_order_then_id(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Charts::new(&mut conn);

        let c = repo.create(&chart("C", "staff-by-role", 2)).await.unwrap();
        let a = repo.create(&chart("A", "projects-by-status", 1)).await.unwrap();
        let b = repo.create(&chart("B", "projects-by-category", 1)).await.unwrap();

        let ids: Vec<_> = repo.list(&AllRows).await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_seed_skips_existing_data_types(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Charts::new(&mut conn);

        repo.create(&chart("Mío", "staff-by-role", 5)).await.unwrap();

        let defaults = [chart("Por rol", "staff-by-role", 2), chart("Por estado", "projects-by-status", 3)];
        assert_eq!(repo.seed(&defaults).await.unwrap(), 1);
        assert_eq!(repo.seed(&defaults).await.unwrap(), 0);

        let charts = repo.list(&AllRows).await.unwrap();
        assert_eq!(charts.len(), 2);
        assert!(charts.iter().any(|c| c.title == "Mío"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Charts::new(&mut conn);

        let created = repo.create(&chart("Viejo", "staff-by-role", 0)).await.unwrap();
        let mut changed = chart("Nuevo", "staff-by-role", 4);
        changed.chart_type = ChartType::Line;
        changed.enabled = false;

        let updated = repo.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.title, "Nuevo");
        assert_eq!(updated.chart_type, ChartType::Line);
        assert_eq!(updated.chart_order, 4);
        assert!(!updated.enabled);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(matches!(repo.update(created.id, &changed).await, Err(DbError::NotFound)));
    }
}
