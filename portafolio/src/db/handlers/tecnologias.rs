//! Database repository for technology profiles.

use crate::types::{ProyectoId, TecnologiasId};
use crate::{
    api::models::tecnologias::{TecnologiasInput, TecnologiasProfile},
    db::{
        errors::Result,
        handlers::{
            partial::PartialUpdate,
            repository::{AllRows, Repository},
        },
        models::tecnologias::TecnologiasDBResponse,
    },
};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

pub struct Tecnologias<'c> {
    db: &'c mut PgConnection,
}

fn apply_profile<'a>(update: &mut PartialUpdate<'a>, profile: &TecnologiasProfile) {
    update
        .set("lenguaje_desarrollo", profile.lenguaje_desarrollo.clone())
        .set("base_datos", profile.base_datos.clone())
        .set("control_versiones", profile.control_versiones.clone())
        .set("tamano_bd", profile.tamano_bd.clone())
        .set("alojamiento_infra", profile.alojamiento_infra.clone())
        .set("label", profile.label.clone())
        .set("mantenimiento_soporte", profile.mantenimiento_soporte.clone())
        .set("status_pmo", profile.status_pmo.clone())
        .set("status_salud", profile.status_salud.clone())
        .set("changelog", profile.changelog.clone())
        .set("ano_inicio_sistema", profile.ano_inicio_sistema)
        .set("usuarios_internos", profile.usuarios_internos)
        .set("usuarios_externos", profile.usuarios_externos);
}

impl<'c> Tecnologias<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_proyecto(&mut self, proyecto_id: ProyectoId) -> Result<Option<TecnologiasDBResponse>> {
        let row = sqlx::query_as::<_, TecnologiasDBResponse>("SELECT * FROM tecnologias WHERE proyecto_id = $1")
            .bind(proyecto_id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(row)
    }

    /// Profiles for a set of projects, keyed by project.
    #[instrument(skip(self, proyecto_ids), fields(count = proyecto_ids.len()), err)]
    pub async fn get_by_proyectos(
        &mut self,
        proyecto_ids: &[ProyectoId],
    ) -> Result<HashMap<ProyectoId, TecnologiasDBResponse>> {
        if proyecto_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TecnologiasDBResponse>("SELECT * FROM tecnologias WHERE proyecto_id = ANY($1)")
            .bind(proyecto_ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|t| (t.proyecto_id, t)).collect())
    }

    /// Update the project's profile in place, or create it. Fields absent
    /// from `profile` keep their stored value.
    #[instrument(skip(self, profile), err)]
    pub async fn upsert_for_proyecto(
        &mut self,
        proyecto_id: ProyectoId,
        profile: &TecnologiasProfile,
    ) -> Result<TecnologiasDBResponse> {
        match self.get_by_proyecto(proyecto_id).await? {
            Some(existing) => {
                let mut update = PartialUpdate::new("tecnologias");
                apply_profile(&mut update, profile);
                update.execute(existing.id, &mut *self.db).await
            }
            None => {
                self.create(&TecnologiasInput {
                    proyecto_id,
                    profile: profile.clone(),
                })
                .await
            }
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Tecnologias<'c> {
    type CreateRequest = TecnologiasInput;
    type UpdateRequest = TecnologiasInput;
    type Response = TecnologiasDBResponse;
    type Id = TecnologiasId;
    type Filter = AllRows;

    #[instrument(skip(self, request), fields(proyecto_id = request.proyecto_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let p = &request.profile;
        let row = sqlx::query_as::<_, TecnologiasDBResponse>(
            r#"
            INSERT INTO tecnologias (
                proyecto_id, lenguaje_desarrollo, base_datos, control_versiones, tamano_bd,
                alojamiento_infra, label, mantenimiento_soporte, status_pmo, status_salud,
                changelog, ano_inicio_sistema, usuarios_internos, usuarios_externos
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(request.proyecto_id)
        .bind(p.lenguaje_desarrollo.clone().flatten())
        .bind(p.base_datos.clone().flatten())
        .bind(p.control_versiones.clone().flatten())
        .bind(p.tamano_bd.clone().flatten())
        .bind(p.alojamiento_infra.clone().flatten())
        .bind(p.label.clone().flatten())
        .bind(p.mantenimiento_soporte.clone().flatten())
        .bind(p.status_pmo.clone().flatten())
        .bind(p.status_salud.clone().flatten())
        .bind(p.changelog.clone().flatten())
        .bind(p.ano_inicio_sistema.flatten())
        .bind(p.usuarios_internos.flatten())
        .bind(p.usuarios_externos.flatten())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, TecnologiasDBResponse>("SELECT * FROM tecnologias WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<TecnologiasId>) -> Result<HashMap<Self::Id, TecnologiasDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TecnologiasDBResponse>("SELECT * FROM tecnologias WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|t| (t.id, t)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, TecnologiasDBResponse>("SELECT * FROM tecnologias ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tecnologias WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut update = PartialUpdate::new("tecnologias");
        update.set("proyecto_id", Some(request.proyecto_id));
        apply_profile(&mut update, &request.profile);

        update.execute(id, &mut *self.db).await
    }
}
