//! Rows of the one-to-one project detail tables.
//!
//! These carry nothing the API needs to hide, so they double as response
//! bodies.

use crate::types::ProyectoId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, ToSchema)]
pub struct BackendDetailsDBResponse {
    pub id: i32,
    pub proyecto_id: ProyectoId,
    pub lenguaje: Option<String>,
    pub framework: Option<String>,
    pub version: Option<String>,
    pub base_datos: Option<String>,
    pub orm: Option<String>,
    pub repositorio: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, ToSchema)]
pub struct FrontendDetailsDBResponse {
    pub id: i32,
    pub proyecto_id: ProyectoId,
    pub framework: Option<String>,
    pub version: Option<String>,
    pub lenguaje: Option<String>,
    pub libreria_ui: Option<String>,
    pub repositorio: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, ToSchema)]
pub struct InfraestructuraDBResponse {
    pub id: i32,
    pub proyecto_id: ProyectoId,
    pub proveedor: Option<String>,
    pub servidor: Option<String>,
    pub sistema_operativo: Option<String>,
    pub dominio: Option<String>,
    pub ambiente: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, ToSchema)]
pub struct LicenciasDBResponse {
    pub id: i32,
    pub proyecto_id: ProyectoId,
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub proveedor: Option<String>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub costo: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
