//! Database repository for clientes.

use crate::types::ClienteId;
use crate::{
    api::models::clientes::ClienteInput,
    db::{
        errors::Result,
        handlers::{
            partial::PartialUpdate,
            repository::{AllRows, Repository},
        },
        models::clientes::ClienteDBResponse,
    },
};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

pub struct Clientes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Clientes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clientes")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Clientes<'c> {
    type CreateRequest = ClienteInput;
    type UpdateRequest = ClienteInput;
    type Response = ClienteDBResponse;
    type Id = ClienteId;
    type Filter = AllRows;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let cliente = sqlx::query_as::<_, ClienteDBResponse>(
            r#"
            INSERT INTO clientes (
                cliente, mail_cliente, cel_cliente, observacion_general, nombre_publico,
                nombre_interno, tipo, fecha_inicio_desarrollo, estado, dependencia_uso,
                uso_interno_ministerio, uso_interno_equipo_desarrollo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(request.cliente.clone().flatten())
        .bind(request.mail_cliente.clone().flatten())
        .bind(request.cel_cliente.clone().flatten())
        .bind(request.observacion_general.clone().flatten())
        .bind(request.nombre_publico.clone().flatten())
        .bind(request.nombre_interno.clone().flatten())
        .bind(request.tipo.clone().flatten())
        .bind(request.fecha_inicio_desarrollo.flatten())
        .bind(request.estado.flatten())
        .bind(request.dependencia_uso.clone().flatten())
        .bind(request.uso_interno_ministerio.flatten())
        .bind(request.uso_interno_equipo_desarrollo.flatten())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(cliente)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let cliente = sqlx::query_as::<_, ClienteDBResponse>("SELECT * FROM clientes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(cliente)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<ClienteId>) -> Result<HashMap<Self::Id, ClienteDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let clientes = sqlx::query_as::<_, ClienteDBResponse>("SELECT * FROM clientes WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(clientes.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let clientes = sqlx::query_as::<_, ClienteDBResponse>("SELECT * FROM clientes ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(clientes)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clientes WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("clientes");
        update
            .set("cliente", request.cliente.clone())
            .set("mail_cliente", request.mail_cliente.clone())
            .set("cel_cliente", request.cel_cliente.clone())
            .set("observacion_general", request.observacion_general.clone())
            .set("nombre_publico", request.nombre_publico.clone())
            .set("nombre_interno", request.nombre_interno.clone())
            .set("tipo", request.tipo.clone())
            .set("fecha_inicio_desarrollo", request.fecha_inicio_desarrollo)
            .set("estado", request.estado)
            .set("dependencia_uso", request.dependencia_uso.clone())
            .set("uso_interno_ministerio", request.uso_interno_ministerio)
            .set("uso_interno_equipo_desarrollo", request.uso_interno_equipo_desarrollo);

        update.execute(id, &mut *self.db).await
    }
}
