//! Database models for integraciones.

use crate::types::{IntegracionId, ProyectoId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IntegracionDBResponse {
    pub id: IntegracionId,
    pub nombre: String,
    pub detalles: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An integracion row joined through `proyecto_integraciones`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IntegracionLink {
    pub proyecto_id: ProyectoId,
    #[sqlx(flatten)]
    pub integracion: IntegracionDBResponse,
}
