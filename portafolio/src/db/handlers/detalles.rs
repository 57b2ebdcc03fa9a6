//! One-to-one project detail tables: backend, frontend, infraestructura and
//! licencias. They share a shape (keyed by a unique `proyecto_id`, replaced
//! wholesale on write), so one generic repository serves all four.

use sqlx::{PgConnection, Postgres, QueryBuilder, postgres::PgRow, query_builder::Separated};
use std::collections::HashMap;
use tracing::instrument;

use crate::api::models::detalles::{BackendDetailsInput, FrontendDetailsInput, InfraestructuraInput, LicenciasInput};
use crate::db::errors::Result;
use crate::db::models::detalles::{
    BackendDetailsDBResponse, FrontendDetailsDBResponse, InfraestructuraDBResponse, LicenciasDBResponse,
};
use crate::types::ProyectoId;

/// A row of a detail table, and how to write one from its request body.
pub trait DetailRow: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Writable columns, in the order `bind_input` pushes them
    const COLUMNS: &'static [&'static str];
    type Input: Sync;

    fn proyecto_id(&self) -> ProyectoId;
    fn bind_input(input: &Self::Input, values: &mut Separated<'_, '_, Postgres, &'static str>);
}

impl DetailRow for BackendDetailsDBResponse {
    const TABLE: &'static str = "backend_details";
    const COLUMNS: &'static [&'static str] =
        &["lenguaje", "framework", "version", "base_datos", "orm", "repositorio", "observaciones"];
    type Input = BackendDetailsInput;

    fn proyecto_id(&self) -> ProyectoId {
        self.proyecto_id
    }

    fn bind_input(input: &Self::Input, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(input.lenguaje.clone())
            .push_bind(input.framework.clone())
            .push_bind(input.version.clone())
            .push_bind(input.base_datos.clone())
            .push_bind(input.orm.clone())
            .push_bind(input.repositorio.clone())
            .push_bind(input.observaciones.clone());
    }
}

impl DetailRow for FrontendDetailsDBResponse {
    const TABLE: &'static str = "frontend_details";
    const COLUMNS: &'static [&'static str] =
        &["framework", "version", "lenguaje", "libreria_ui", "repositorio", "observaciones"];
    type Input = FrontendDetailsInput;

    fn proyecto_id(&self) -> ProyectoId {
        self.proyecto_id
    }

    fn bind_input(input: &Self::Input, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(input.framework.clone())
            .push_bind(input.version.clone())
            .push_bind(input.lenguaje.clone())
            .push_bind(input.libreria_ui.clone())
            .push_bind(input.repositorio.clone())
            .push_bind(input.observaciones.clone());
    }
}

impl DetailRow for InfraestructuraDBResponse {
    const TABLE: &'static str = "infraestructura";
    const COLUMNS: &'static [&'static str] =
        &["proveedor", "servidor", "sistema_operativo", "dominio", "ambiente", "observaciones"];
    type Input = InfraestructuraInput;

    fn proyecto_id(&self) -> ProyectoId {
        self.proyecto_id
    }

    fn bind_input(input: &Self::Input, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(input.proveedor.clone())
            .push_bind(input.servidor.clone())
            .push_bind(input.sistema_operativo.clone())
            .push_bind(input.dominio.clone())
            .push_bind(input.ambiente.clone())
            .push_bind(input.observaciones.clone());
    }
}

impl DetailRow for LicenciasDBResponse {
    const TABLE: &'static str = "licencias";
    const COLUMNS: &'static [&'static str] =
        &["nombre", "tipo", "proveedor", "fecha_vencimiento", "costo", "observaciones"];
    type Input = LicenciasInput;

    fn proyecto_id(&self) -> ProyectoId {
        self.proyecto_id
    }

    fn bind_input(input: &Self::Input, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(input.nombre.clone())
            .push_bind(input.tipo.clone())
            .push_bind(input.proveedor.clone())
            .push_bind(input.fecha_vencimiento)
            .push_bind(input.costo.clone())
            .push_bind(input.observaciones.clone());
    }
}

pub struct Detalles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Detalles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert the project's row, or overwrite every writable column of the
    /// existing one.
    #[instrument(skip(self, input), fields(table = R::TABLE), err)]
    pub async fn upsert<R: DetailRow>(&mut self, proyecto_id: ProyectoId, input: &R::Input) -> Result<R> {
        let mut query = QueryBuilder::new(format!(
            "INSERT INTO {} (proyecto_id, {}) VALUES (",
            R::TABLE,
            R::COLUMNS.join(", ")
        ));
        {
            let mut values = query.separated(", ");
            values.push_bind(proyecto_id);
            R::bind_input(input, &mut values);
        }

        let assignments = R::COLUMNS
            .iter()
            .map(|column| format!("{column} = EXCLUDED.{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        query
            .push(") ON CONFLICT (proyecto_id) DO UPDATE SET ")
            .push(assignments)
            .push(", updated_at = NOW() RETURNING *");

        let row = query.build_query_as::<R>().fetch_one(&mut *self.db).await?;
        Ok(row)
    }

    /// Rows for a set of projects, keyed by project.
    #[instrument(skip(self, proyecto_ids), fields(table = R::TABLE, count = proyecto_ids.len()), err)]
    pub async fn get_by_proyectos<R: DetailRow>(&mut self, proyecto_ids: &[ProyectoId]) -> Result<HashMap<ProyectoId, R>> {
        if proyecto_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, R>(&format!("SELECT * FROM {} WHERE proyecto_id = ANY($1)", R::TABLE))
            .bind(proyecto_ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|row| (row.proyecto_id(), row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use chrono::NaiveDate;
    use sqlx::PgPool;

    async fn proyecto(pool: &PgPool) -> ProyectoId {
        sqlx::query_scalar("INSERT INTO proyectos (titulo_proyecto) VALUES ('Expedientes') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_replaces_existing_row(pool: PgPool) {
        let id = proyecto(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Detalles::new(&mut conn);

        let first: BackendDetailsDBResponse = repo
            .upsert(
                id,
                &BackendDetailsInput {
                    lenguaje: Some("Python".to_string()),
                    framework: Some("Django".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let second: BackendDetailsDBResponse = repo
            .upsert(
                id,
                &BackendDetailsInput {
                    lenguaje: Some("Rust".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.lenguaje.as_deref(), Some("Rust"));
        assert_eq!(second.framework, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_licencias_and_lookup(pool: PgPool) {
        let id = proyecto(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Detalles::new(&mut conn);

        let vence = NaiveDate::from_ymd_opt(2027, 1, 15);
        repo.upsert::<LicenciasDBResponse>(
            id,
            &LicenciasInput {
                nombre: Some("Oracle DB".to_string()),
                fecha_vencimiento: vence,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = repo.get_by_proyectos::<LicenciasDBResponse>(&[id, id + 1]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&id].fecha_vencimiento, vence);

        let none = repo.get_by_proyectos::<InfraestructuraDBResponse>(&[id]).await.unwrap();
        assert!(none.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_project_is_fk_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Detalles::new(&mut conn);

        let result = repo
            .upsert::<FrontendDetailsDBResponse>(12345, &FrontendDetailsInput::default())
            .await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }
}
