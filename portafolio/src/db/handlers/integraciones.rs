//! Database repository for integraciones.

use crate::types::IntegracionId;
use crate::{
    api::models::integraciones::IntegracionInput,
    db::{
        errors::{DbError, Result},
        handlers::{contains_pattern, repository::Repository},
        models::integraciones::IntegracionDBResponse,
    },
};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing integraciones
#[derive(Debug, Clone)]
pub struct IntegracionFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive match on nombre or detalles
    pub search: Option<String>,
}

impl IntegracionFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }
}

fn push_integracion_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &IntegracionFilter) {
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        query
            .push(" WHERE (nombre ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR detalles ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

pub struct Integraciones<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Integraciones<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &IntegracionFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM integraciones");
        push_integracion_filter(&mut query, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn exists(&mut self, id: IntegracionId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM integraciones WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(exists)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Integraciones<'c> {
    type CreateRequest = IntegracionInput;
    type UpdateRequest = IntegracionInput;
    type Response = IntegracionDBResponse;
    type Id = IntegracionId;
    type Filter = IntegracionFilter;

    #[instrument(skip(self, request), fields(nombre = %request.nombre), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let integracion = sqlx::query_as::<_, IntegracionDBResponse>(
            "INSERT INTO integraciones (nombre, detalles) VALUES ($1, $2) RETURNING *",
        )
        .bind(request.nombre.trim())
        .bind(request.detalles.trim())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(integracion)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let integracion = sqlx::query_as::<_, IntegracionDBResponse>("SELECT * FROM integraciones WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(integracion)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<IntegracionId>) -> Result<HashMap<Self::Id, IntegracionDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, IntegracionDBResponse>("SELECT * FROM integraciones WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|i| (i.id, i)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM integraciones");
        push_integracion_filter(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let rows = query
            .build_query_as::<IntegracionDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM integraciones WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let integracion = sqlx::query_as::<_, IntegracionDBResponse>(
            r#"
            UPDATE integraciones SET nombre = $2, detalles = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.nombre.trim())
        .bind(request.detalles.trim())
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(integracion)
    }
}
