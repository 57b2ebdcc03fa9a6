//! Database repository for staff.

use crate::types::StaffId;
use crate::{
    api::models::staff::StaffInput,
    db::{
        errors::Result,
        handlers::{contains_pattern, partial::PartialUpdate, repository::Repository},
        models::staff::{StaffCreateDBRequest, StaffDBResponse},
    },
};
use sqlx::{Connection, PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing staff
#[derive(Debug, Clone)]
pub struct StaffFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive match on nombre_completo or rol
    pub search: Option<String>,
}

impl StaffFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }
}

fn push_staff_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &StaffFilter) {
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        query
            .push(" WHERE (nombre_completo ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR rol::text ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

pub struct Staff<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Staff<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &StaffFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM staff");
        push_staff_filter(&mut query, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn exists(&mut self, id: StaffId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM staff WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(exists)
    }

    /// Insert every row or none of them.
    #[instrument(skip(self, rows), fields(count = rows.len()), err)]
    pub async fn create_many(&mut self, rows: &[StaffCreateDBRequest]) -> Result<usize> {
        let mut tx = self.db.begin().await?;
        {
            let mut repo = Staff::new(&mut tx);
            for row in rows {
                repo.create(row).await?;
            }
        }
        tx.commit().await?;
        Ok(rows.len())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Staff<'c> {
    type CreateRequest = StaffCreateDBRequest;
    type UpdateRequest = StaffInput;
    type Response = StaffDBResponse;
    type Id = StaffId;
    type Filter = StaffFilter;

    #[instrument(skip(self, request), fields(nombre = %request.nombre_completo), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let staff = sqlx::query_as::<_, StaffDBResponse>(
            r#"
            INSERT INTO staff (
                nombre_completo, contrato, rol, nombres, apellidos, activo, comentario,
                modalidad, experiencia, origen, email, skills, desempeno_ley_dto, hhee,
                ur, coordinacion, presencialidad, cumpleanos, edad
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(&request.nombre_completo)
        .bind(&request.contrato)
        .bind(request.rol)
        .bind(&request.nombres)
        .bind(&request.apellidos)
        .bind(request.activo)
        .bind(&request.comentario)
        .bind(request.modalidad)
        .bind(request.experiencia)
        .bind(&request.origen)
        .bind(&request.email)
        .bind(&request.skills)
        .bind(&request.desempeno_ley_dto)
        .bind(&request.hhee)
        .bind(&request.ur)
        .bind(&request.coordinacion)
        .bind(&request.presencialidad)
        .bind(&request.cumpleanos)
        .bind(request.edad)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(staff)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let staff = sqlx::query_as::<_, StaffDBResponse>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(staff)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<StaffId>) -> Result<HashMap<Self::Id, StaffDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let staff = sqlx::query_as::<_, StaffDBResponse>("SELECT * FROM staff WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(staff.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM staff");
        push_staff_filter(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let staff = query.build_query_as::<StaffDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(staff)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("staff");
        update
            .set("nombre_completo", Some(request.nombre_completo.trim().to_string()))
            .set("contrato", request.contrato.clone())
            .set("rol", request.rol)
            .set("nombres", request.nombres.clone())
            .set("apellidos", request.apellidos.clone())
            .set("activo", request.activo)
            .set("comentario", request.comentario.clone())
            .set("modalidad", request.modalidad)
            .set("experiencia", request.experiencia)
            .set("origen", request.origen.clone())
            .set("email", request.email.clone().map(|e| e.filter(|e| !e.is_empty())))
            .set("skills", request.skills.clone())
            .set("desempeno_ley_dto", request.desempeno_ley_dto.clone())
            .set("hhee", request.hhee.clone())
            .set("ur", request.ur.clone())
            .set("coordinacion", request.coordinacion.clone())
            .set("presencialidad", request.presencialidad.clone())
            .set("cumpleanos", request.cumpleanos.clone())
            .set("edad", request.edad);

        update.execute(id, &mut *self.db).await
    }
}
