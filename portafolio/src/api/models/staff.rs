//! API request/response models for staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::enums::{ExperienciaStaff, ModalidadStaff, RolStaff};
use super::fields::{nullable_enum, present};
use super::pagination::Pagination;
use crate::api::validation::{Validate, optional_email, require_non_empty, require_non_negative};
use crate::db::models::staff::StaffDBResponse;
use crate::types::StaffId;

/// Body for creating or updating a staff member. `nombre_completo` is always
/// required; other fields are tri-state on update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StaffInput {
    pub nombre_completo: String,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub contrato: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<RolStaff>)]
    pub rol: Option<Option<RolStaff>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub nombres: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub apellidos: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<bool>)]
    pub activo: Option<Option<bool>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub comentario: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<ModalidadStaff>)]
    pub modalidad: Option<Option<ModalidadStaff>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<ExperienciaStaff>)]
    pub experiencia: Option<Option<ExperienciaStaff>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub origen: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = "email")]
    pub email: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub skills: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub desempeno_ley_dto: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub hhee: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub ur: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub coordinacion: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub presencialidad: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub cumpleanos: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, minimum = 0)]
    pub edad: Option<Option<i32>>,
}

impl Validate for StaffInput {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("nombre_completo", &self.nombre_completo)?;
        optional_email("email", present(&self.email))?;
        require_non_negative("edad", self.edad.flatten())
    }
}

/// Query parameters for listing staff
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStaffQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive match on nombre_completo or rol
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffResponse {
    pub id: StaffId,
    pub nombre_completo: String,
    pub contrato: Option<String>,
    pub rol: Option<RolStaff>,
    pub nombres: Option<String>,
    pub apellidos: Option<String>,
    pub activo: Option<bool>,
    pub comentario: Option<String>,
    pub modalidad: Option<ModalidadStaff>,
    pub experiencia: Option<ExperienciaStaff>,
    pub origen: Option<String>,
    pub email: Option<String>,
    pub skills: Option<String>,
    pub desempeno_ley_dto: Option<String>,
    pub hhee: Option<String>,
    pub ur: Option<String>,
    pub coordinacion: Option<String>,
    pub presencialidad: Option<String>,
    pub cumpleanos: Option<String>,
    pub edad: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffListResponse {
    pub staff: Vec<StaffResponse>,
    pub total_count: i64,
}

impl From<StaffDBResponse> for StaffResponse {
    fn from(db: StaffDBResponse) -> Self {
        Self {
            id: db.id,
            nombre_completo: db.nombre_completo,
            contrato: db.contrato,
            rol: db.rol,
            nombres: db.nombres,
            apellidos: db.apellidos,
            activo: db.activo,
            comentario: db.comentario,
            modalidad: db.modalidad,
            experiencia: db.experiencia,
            origen: db.origen,
            email: db.email,
            skills: db.skills,
            desempeno_ley_dto: db.desempeno_ley_dto,
            hhee: db.hhee,
            ur: db.ur,
            coordinacion: db.coordinacion,
            presencialidad: db.presencialidad,
            cumpleanos: db.cumpleanos,
            edad: db.edad,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
