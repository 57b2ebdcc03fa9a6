//! API request/response models for integraciones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;
use crate::api::validation::{Validate, require_non_empty};
use crate::db::models::integraciones::IntegracionDBResponse;
use crate::types::IntegracionId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IntegracionInput {
    pub nombre: String,
    pub detalles: String,
}

impl Validate for IntegracionInput {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("nombre", &self.nombre)?;
        require_non_empty("detalles", &self.detalles)
    }
}

/// Query parameters for listing integraciones
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIntegracionesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive match on nombre or detalles
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntegracionResponse {
    pub id: IntegracionId,
    pub nombre: String,
    pub detalles: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegracionesListResponse {
    pub integraciones: Vec<IntegracionResponse>,
    pub total_count: i64,
}

impl From<IntegracionDBResponse> for IntegracionResponse {
    fn from(db: IntegracionDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            detalles: db.detalles,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
