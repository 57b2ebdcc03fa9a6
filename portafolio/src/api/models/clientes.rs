//! API request/response models for clientes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::EstadoProyecto;
use super::fields::{nullable_datetime, nullable_enum, present};
use crate::api::validation::{Validate, optional_email};
use crate::db::models::clientes::ClienteDBResponse;
use crate::types::ClienteId;

/// Body for creating or replacing a cliente. Every field is optional; on
/// update, absent fields are left untouched and `null` clears them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClienteInput {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub cliente: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = "email")]
    pub mail_cliente: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub cel_cliente: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub observacion_general: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub nombre_publico: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub nombre_interno: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub tipo: Option<Option<String>>,
    /// ISO-8601 date or datetime
    #[serde(default, deserialize_with = "nullable_datetime")]
    #[schema(value_type = Option<String>)]
    pub fecha_inicio_desarrollo: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<EstadoProyecto>)]
    pub estado: Option<Option<EstadoProyecto>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub dependencia_uso: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<bool>)]
    pub uso_interno_ministerio: Option<Option<bool>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<bool>)]
    pub uso_interno_equipo_desarrollo: Option<Option<bool>>,
}

impl Validate for ClienteInput {
    fn validate(&self) -> Result<(), String> {
        optional_email("mail_cliente", present(&self.mail_cliente))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClienteResponse {
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

impl From<ClienteDBResponse> for ClienteResponse {
    fn from(db: ClienteDBResponse) -> Self {
        Self {
            id: db.id,
            cliente: db.cliente,
            mail_cliente: db.mail_cliente,
            cel_cliente: db.cel_cliente,
            observacion_general: db.observacion_general,
            nombre_publico: db.nombre_publico,
            nombre_interno: db.nombre_interno,
            tipo: db.tipo,
            fecha_inicio_desarrollo: db.fecha_inicio_desarrollo,
            estado: db.estado,
            dependencia_uso: db.dependencia_uso,
            uso_interno_ministerio: db.uso_interno_ministerio,
            uso_interno_equipo_desarrollo: db.uso_interno_equipo_desarrollo,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
