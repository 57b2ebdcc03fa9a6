//! Database models for clientes.

use crate::api::models::enums::EstadoProyecto;
use crate::types::ClienteId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClienteDBResponse {
    pub id: ClienteId,
    pub cliente: Option<String>,
    pub mail_cliente: Option<String>,
    pub cel_cliente: Option<String>,
    pub observacion_general: Option<String>,
    pub nombre_publico: Option<String>,
    pub nombre_interno: Option<String>,
    pub tipo: Option<String>,
    pub fecha_inicio_desarrollo: Option<DateTime<Utc>>,
    pub estado: Option<EstadoProyecto>,
    pub dependencia_uso: Option<String>,
    pub uso_interno_ministerio: Option<bool>,
    pub uso_interno_equipo_desarrollo: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
