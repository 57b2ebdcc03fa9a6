//! Database models for technology profiles.

use crate::types::{ProyectoId, TecnologiasId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TecnologiasDBResponse {
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
