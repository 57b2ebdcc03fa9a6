//! API request/response models for technology profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::validation::{Validate, require_non_negative};
use crate::db::models::tecnologias::TecnologiasDBResponse;
use crate::types::{ProyectoId, TecnologiasId};

/// The descriptive part of a technology profile, shared by the standalone
/// resource and the `PUT /proyectos/{id}/tecnologias` upsert.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TecnologiasProfile {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub lenguaje_desarrollo: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub base_datos: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub control_versiones: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub tamano_bd: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub alojamiento_infra: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub label: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub mantenimiento_soporte: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub status_pmo: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub status_salud: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub changelog: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub ano_inicio_sistema: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, minimum = 0)]
    pub usuarios_internos: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, minimum = 0)]
    pub usuarios_externos: Option<Option<i32>>,
}

impl Validate for TecnologiasProfile {
    fn validate(&self) -> Result<(), String> {
        require_non_negative("usuarios_internos", self.usuarios_internos.flatten())?;
        require_non_negative("usuarios_externos", self.usuarios_externos.flatten())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TecnologiasInput {
    pub proyecto_id: ProyectoId,
    #[serde(flatten)]
    pub profile: TecnologiasProfile,
}

impl Validate for TecnologiasInput {
    fn validate(&self) -> Result<(), String> {
        self.profile.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TecnologiasResponse {
    pub id: TecnologiasId,
    pub proyecto_id: ProyectoId,
    pub lenguaje_desarrollo: Option<String>,
    pub base_datos: Option<String>,
    pub control_versiones: Option<String>,
    pub tamano_bd: Option<String>,
    pub alojamiento_infra: Option<String>,
    pub label: Option<String>,
    pub mantenimiento_soporte: Option<String>,
    pub status_pmo: Option<String>,
    pub status_salud: Option<String>,
    pub changelog: Option<String>,
    pub ano_inicio_sistema: Option<i32>,
    pub usuarios_internos: Option<i32>,
    pub usuarios_externos: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TecnologiasDBResponse> for TecnologiasResponse {
    fn from(db: TecnologiasDBResponse) -> Self {
        Self {
            id: db.id,
            proyecto_id: db.proyecto_id,
            lenguaje_desarrollo: db.lenguaje_desarrollo,
            base_datos: db.base_datos,
            control_versiones: db.control_versiones,
            tamano_bd: db.tamano_bd,
            alojamiento_infra: db.alojamiento_infra,
            label: db.label,
            mantenimiento_soporte: db.mantenimiento_soporte,
            status_pmo: db.status_pmo,
            status_salud: db.status_salud,
            changelog: db.changelog,
            ano_inicio_sistema: db.ano_inicio_sistema,
            usuarios_internos: db.usuarios_internos,
            usuarios_externos: db.usuarios_externos,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
