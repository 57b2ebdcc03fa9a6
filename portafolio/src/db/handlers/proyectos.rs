//! Database repository for proyectos and their many-to-many links.

use crate::types::{IntegracionId, ProyectoId, StaffId};
use crate::{
    api::models::{clientes::ClienteInput, proyectos::ProyectoInput},
    db::{
        errors::{DbError, Result},
        handlers::{clientes::Clientes, contains_pattern, partial::PartialUpdate, repository::Repository},
        models::{
            clientes::ClienteDBResponse,
            integraciones::{IntegracionDBResponse, IntegracionLink},
            proyectos::{ProyectoCreateDBRequest, ProyectoDBResponse},
            staff::{StaffDBResponse, StaffLink},
        },
    },
};
use sqlx::{Connection, PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing proyectos
#[derive(Debug, Clone)]
pub struct ProyectoFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive match on titulo_proyecto
    pub search: Option<String>,
}

impl ProyectoFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }
}

fn push_proyecto_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ProyectoFilter) {
    if let Some(search) = &filter.search {
        query
            .push(" WHERE titulo_proyecto ILIKE ")
            .push_bind(contains_pattern(search))
            .push(" ESCAPE '\\'");
    }
}

pub struct Proyectos<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Proyectos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &ProyectoFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM proyectos");
        push_proyecto_filter(&mut query, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn exists(&mut self, id: ProyectoId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM proyectos WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(exists)
    }

    /// Insert every row or none of them.
    #[instrument(skip(self, rows), fields(count = rows.len()), err)]
    pub async fn create_many(&mut self, rows: &[ProyectoCreateDBRequest]) -> Result<usize> {
        let mut tx = self.db.begin().await?;
        {
            let mut repo = Proyectos::new(&mut tx);
            for row in rows {
                repo.create(row).await?;
            }
        }
        tx.commit().await?;
        Ok(rows.len())
    }

    /// Staff linked to each of the given projects, ordered by staff id.
    #[instrument(skip(self, proyecto_ids), fields(count = proyecto_ids.len()), err)]
    pub async fn staff_for(&mut self, proyecto_ids: &[ProyectoId]) -> Result<HashMap<ProyectoId, Vec<StaffDBResponse>>> {
        if proyecto_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = sqlx::query_as::<_, StaffLink>(
            r#"
            SELECT ps.proyecto_id, s.*
            FROM proyecto_staff ps
            JOIN staff s ON s.id = ps.staff_id
            WHERE ps.proyecto_id = ANY($1)
            ORDER BY s.id
            "#,
        )
        .bind(proyecto_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut grouped: HashMap<ProyectoId, Vec<StaffDBResponse>> = HashMap::new();
        for link in links {
            grouped.entry(link.proyecto_id).or_default().push(link.staff);
        }
        Ok(grouped)
    }

    /// Integraciones linked to each of the given projects, ordered by id.
    #[instrument(skip(self, proyecto_ids), fields(count = proyecto_ids.len()), err)]
    pub async fn integraciones_for(
        &mut self,
        proyecto_ids: &[ProyectoId],
    ) -> Result<HashMap<ProyectoId, Vec<IntegracionDBResponse>>> {
        if proyecto_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = sqlx::query_as::<_, IntegracionLink>(
            r#"
            SELECT pi.proyecto_id, i.*
            FROM proyecto_integraciones pi
            JOIN integraciones i ON i.id = pi.integracion_id
            WHERE pi.proyecto_id = ANY($1)
            ORDER BY i.id
            "#,
        )
        .bind(proyecto_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut grouped: HashMap<ProyectoId, Vec<IntegracionDBResponse>> = HashMap::new();
        for link in links {
            grouped.entry(link.proyecto_id).or_default().push(link.integracion);
        }
        Ok(grouped)
    }

    /// Idempotent: linking twice leaves one row.
    #[instrument(skip(self), err)]
    pub async fn link_staff(&mut self, proyecto_id: ProyectoId, staff_id: StaffId) -> Result<()> {
        sqlx::query("INSERT INTO proyecto_staff (proyecto_id, staff_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(proyecto_id)
            .bind(staff_id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn unlink_staff(&mut self, proyecto_id: ProyectoId, staff_id: StaffId) -> Result<()> {
        sqlx::query("DELETE FROM proyecto_staff WHERE proyecto_id = $1 AND staff_id = $2")
            .bind(proyecto_id)
            .bind(staff_id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn link_integracion(&mut self, proyecto_id: ProyectoId, integracion_id: IntegracionId) -> Result<()> {
        sqlx::query(
            "INSERT INTO proyecto_integraciones (proyecto_id, integracion_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(proyecto_id)
        .bind(integracion_id)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn unlink_integracion(&mut self, proyecto_id: ProyectoId, integracion_id: IntegracionId) -> Result<()> {
        sqlx::query("DELETE FROM proyecto_integraciones WHERE proyecto_id = $1 AND integracion_id = $2")
            .bind(proyecto_id)
            .bind(integracion_id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    /// Update the project's cliente, or create one and link it.
    #[instrument(skip(self, input), err)]
    pub async fn upsert_cliente(&mut self, proyecto_id: ProyectoId, input: &ClienteInput) -> Result<ClienteDBResponse> {
        let mut tx = self.db.begin().await?;

        let current: Option<i32> = sqlx::query_scalar("SELECT cliente_id FROM proyectos WHERE id = $1 FOR UPDATE")
            .bind(proyecto_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

        let cliente = match current {
            Some(cliente_id) => Clientes::new(&mut tx).update(cliente_id, input).await?,
            None => {
                let cliente = Clientes::new(&mut tx).create(input).await?;
                sqlx::query("UPDATE proyectos SET cliente_id = $2, updated_at = NOW() WHERE id = $1")
                    .bind(proyecto_id)
                    .bind(cliente.id)
                    .execute(&mut *tx)
                    .await?;
                cliente
            }
        };

        tx.commit().await?;
        Ok(cliente)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Proyectos<'c> {
    type CreateRequest = ProyectoCreateDBRequest;
    type UpdateRequest = ProyectoInput;
    type Response = ProyectoDBResponse;
    type Id = ProyectoId;
    type Filter = ProyectoFilter;

    #[instrument(skip(self, request), fields(titulo = %request.titulo_proyecto), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let proyecto = sqlx::query_as::<_, ProyectoDBResponse>(
            r#"
            INSERT INTO proyectos (
                titulo_proyecto, storyline, proyecto_activo, origen_dependencia,
                subsecretaria_direccion, categoria, subcategoria, recursos, urls, captura,
                caratula, ticketera_interna, ticketera_externa, tier,
                cantidad_recursos_asignados, estado, cliente_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(&request.titulo_proyecto)
        .bind(&request.storyline)
        .bind(request.proyecto_activo)
        .bind(&request.origen_dependencia)
        .bind(&request.subsecretaria_direccion)
        .bind(request.categoria)
        .bind(request.subcategoria)
        .bind(&request.recursos)
        .bind(&request.urls)
        .bind(&request.captura)
        .bind(&request.caratula)
        .bind(&request.ticketera_interna)
        .bind(&request.ticketera_externa)
        .bind(request.tier)
        .bind(request.cantidad_recursos_asignados)
        .bind(request.estado)
        .bind(request.cliente_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(proyecto)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let proyecto = sqlx::query_as::<_, ProyectoDBResponse>("SELECT * FROM proyectos WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(proyecto)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<ProyectoId>) -> Result<HashMap<Self::Id, ProyectoDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProyectoDBResponse>("SELECT * FROM proyectos WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM proyectos");
        push_proyecto_filter(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let rows = query.build_query_as::<ProyectoDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(rows)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM proyectos WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("proyectos");
        update
            .set("titulo_proyecto", Some(request.titulo_proyecto.trim().to_string()))
            .set("storyline", request.storyline.clone())
            .set("proyecto_activo", request.proyecto_activo)
            .set("origen_dependencia", request.origen_dependencia.clone())
            .set("subsecretaria_direccion", request.subsecretaria_direccion.clone())
            .set("categoria", request.categoria)
            .set("subcategoria", request.subcategoria)
            .set("recursos", request.recursos.clone())
            .set("urls", request.urls.clone().map(|u| u.filter(|u| !u.is_empty())))
            .set("captura", request.captura.clone())
            .set("caratula", request.caratula.clone())
            .set("ticketera_interna", request.ticketera_interna.clone())
            .set("ticketera_externa", request.ticketera_externa.clone())
            .set("tier", request.tier)
            .set("cantidad_recursos_asignados", request.cantidad_recursos_asignados)
            .set("estado", request.estado)
            .set("cliente_id", request.cliente_id);

        update.execute(id, &mut *self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::enums::{CategoriaProyecto, Tier};
    use sqlx::PgPool;

    fn proyecto(titulo: &str) -> ProyectoCreateDBRequest {
        ProyectoCreateDBRequest {
            titulo_proyecto: titulo.to_string(),
            ..Default::default()
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_defaults_and_search(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Proyectos::new(&mut conn);

        let created = repo.create(&proyecto("Portal Ciudadano")).await.unwrap();
        assert!(!created.proyecto_activo);
        assert_eq!(created.cantidad_recursos_asignados, 0);

        repo.create(&proyecto("Mesa de Ayuda")).await.unwrap();

        let filter = ProyectoFilter::new(0, 10).with_search(Some("portal".to_string()));
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
        assert_eq!(repo.count(&ProyectoFilter::new(0, 10)).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update_tri_state(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Proyectos::new(&mut conn);

        let mut request = proyecto("Sistema de Turnos");
        request.tier = Some(Tier::Dos);
        request.storyline = Some("Reserva de turnos".to_string());
        let created = repo.create(&request).await.unwrap();

        let update: ProyectoInput = serde_json::from_str(
            r#"{"titulo_proyecto": "Sistema de Turnos", "tier": null, "categoria": "Sistema", "proyecto_activo": true}"#,
        )
        .unwrap();
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.tier, None);
        assert_eq!(updated.categoria, Some(CategoriaProyecto::Sistema));
        assert_eq!(updated.storyline.as_deref(), Some("Reserva de turnos"));
        assert!(updated.proyecto_activo);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_many_is_all_or_nothing(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Proyectos::new(&mut conn);

        let mut bad = proyecto("Con cliente inexistente");
        bad.cliente_id = Some(404);
        let result = repo.create_many(&[proyecto("Uno"), bad]).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
        assert_eq!(repo.count(&ProyectoFilter::new(0, 10)).await.unwrap(), 0);

        assert_eq!(repo.create_many(&[proyecto("Uno"), proyecto("Dos")]).await.unwrap(), 2);
        assert_eq!(repo.count(&ProyectoFilter::new(0, 10)).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_links_are_idempotent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let staff_id: i32 = sqlx::query_scalar("INSERT INTO staff (nombre_completo) VALUES ('Ana') RETURNING id")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        let integracion_id: i32 =
            sqlx::query_scalar("INSERT INTO integraciones (nombre, detalles) VALUES ('SSO', 'Keycloak') RETURNING id")
                .fetch_one(&mut *conn)
                .await
                .unwrap();

        let mut repo = Proyectos::new(&mut conn);
        let p = repo.create(&proyecto("Intranet")).await.unwrap();

        repo.link_staff(p.id, staff_id).await.unwrap();
        repo.link_staff(p.id, staff_id).await.unwrap();
        repo.link_integracion(p.id, integracion_id).await.unwrap();

        let staff = repo.staff_for(&[p.id]).await.unwrap();
        assert_eq!(staff[&p.id].len(), 1);
        assert_eq!(staff[&p.id][0].nombre_completo, "Ana");
        let integraciones = repo.integraciones_for(&[p.id]).await.unwrap();
        assert_eq!(integraciones[&p.id][0].nombre, "SSO");

        repo.unlink_staff(p.id, staff_id).await.unwrap();
        repo.unlink_staff(p.id, staff_id).await.unwrap();
        assert!(repo.staff_for(&[p.id]).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_cliente_creates_then_updates(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Proyectos::new(&mut conn);
        let p = repo.create(&proyecto("Padrón")).await.unwrap();

        let input: ClienteInput = serde_json::from_str(r#"{"cliente": "Ministerio de Trabajo"}"#).unwrap();
        let created = repo.upsert_cliente(p.id, &input).await.unwrap();
        let linked = repo.get_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(linked.cliente_id, Some(created.id));

        let input: ClienteInput = serde_json::from_str(r#"{"tipo": "Externo"}"#).unwrap();
        let updated = repo.upsert_cliente(p.id, &input).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.cliente.as_deref(), Some("Ministerio de Trabajo"));
        assert_eq!(updated.tipo.as_deref(), Some("Externo"));

        assert!(matches!(repo.upsert_cliente(p.id + 10, &input).await, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_cascades_links(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let staff_id: i32 = sqlx::query_scalar("INSERT INTO staff (nombre_completo) VALUES ('Beto') RETURNING id")
            .fetch_one(&mut *conn)
            .await
            .unwrap();

        let mut repo = Proyectos::new(&mut conn);
        let p = repo.create(&proyecto("Temporal")).await.unwrap();
        repo.link_staff(p.id, staff_id).await.unwrap();

        assert!(repo.delete(p.id).await.unwrap());
        drop(repo);

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM proyecto_staff")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
