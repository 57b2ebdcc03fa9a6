//! API request/response models for proyectos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::clientes::ClienteResponse;
use super::enums::{CategoriaProyecto, EstadoProyecto, SubcategoriaProyecto, Tier};
use super::fields::{nullable_enum, present};
use super::integraciones::IntegracionResponse;
use super::pagination::Pagination;
use super::staff::StaffResponse;
use super::tecnologias::TecnologiasResponse;
use crate::api::validation::{Validate, optional_uri, require_non_empty, require_non_negative};
use crate::db::models::detalles::{BackendDetailsDBResponse, FrontendDetailsDBResponse, InfraestructuraDBResponse, LicenciasDBResponse};
use crate::db::models::proyectos::ProyectoDBResponse;
use crate::types::{ClienteId, IntegracionId, ProyectoId, StaffId};

/// Body for creating or updating a project.
///
/// `titulo_proyecto` is required on both. On update every other field is
/// tri-state: absent keeps the stored value, `null` clears it.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProyectoInput {
    pub titulo_proyecto: String,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub storyline: Option<Option<String>>,
    /// Defaults to `false` on create
    pub proyecto_activo: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub origen_dependencia: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub subsecretaria_direccion: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<CategoriaProyecto>)]
    pub categoria: Option<Option<CategoriaProyecto>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<SubcategoriaProyecto>)]
    pub subcategoria: Option<Option<SubcategoriaProyecto>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub recursos: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = "uri")]
    pub urls: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub captura: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub caratula: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub ticketera_interna: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub ticketera_externa: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<Tier>)]
    pub tier: Option<Option<Tier>>,
    /// Defaults to 0 on create
    #[schema(minimum = 0)]
    pub cantidad_recursos_asignados: Option<i32>,
    #[serde(default, deserialize_with = "nullable_enum")]
    #[schema(value_type = Option<EstadoProyecto>)]
    pub estado: Option<Option<EstadoProyecto>>,
    #[serde(
        rename = "clienteId",
        alias = "cliente_id",
        default,
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<i32>)]
    pub cliente_id: Option<Option<ClienteId>>,
}

impl Validate for ProyectoInput {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("titulo_proyecto", &self.titulo_proyecto)?;
        optional_uri("urls", present(&self.urls))?;
        require_non_negative("cantidad_recursos_asignados", self.cantidad_recursos_asignados)
    }
}

/// Query parameters for listing proyectos
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProyectosQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive match on titulo_proyecto
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkStaffRequest {
    pub staff_id: StaffId,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkIntegracionRequest {
    pub integracion_id: IntegracionId,
}

/// A project together with everything hanging off it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProyectoResponse {
    pub id: ProyectoId,
    pub titulo_proyecto: String,
    pub storyline: Option<String>,
    pub proyecto_activo: bool,
    pub origen_dependencia: Option<String>,
    pub subsecretaria_direccion: Option<String>,
    pub categoria: Option<CategoriaProyecto>,
    pub subcategoria: Option<SubcategoriaProyecto>,
    pub recursos: Option<String>,
    pub urls: Option<String>,
    pub captura: Option<String>,
    pub caratula: Option<String>,
    pub ticketera_interna: Option<String>,
    pub ticketera_externa: Option<String>,
    pub tier: Option<Tier>,
    pub cantidad_recursos_asignados: i32,
    pub estado: Option<EstadoProyecto>,
    #[serde(rename = "clienteId")]
    pub cliente_id: Option<ClienteId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub staff: Vec<StaffResponse>,
    pub cliente: Option<ClienteResponse>,
    pub tecnologias: Option<TecnologiasResponse>,
    pub backend_details: Option<BackendDetailsDBResponse>,
    pub frontend_details: Option<FrontendDetailsDBResponse>,
    pub infraestructura: Option<InfraestructuraDBResponse>,
    pub licencias: Option<LicenciasDBResponse>,
    pub integraciones: Vec<IntegracionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProyectosListResponse {
    pub proyectos: Vec<ProyectoResponse>,
    pub total_count: i64,
}

impl From<ProyectoDBResponse> for ProyectoResponse {
    /// The bare row; relations start empty and are filled in by the caller.
    fn from(db: ProyectoDBResponse) -> Self {
        Self {
            id: db.id,
            titulo_proyecto: db.titulo_proyecto,
            storyline: db.storyline,
            proyecto_activo: db.proyecto_activo,
            origen_dependencia: db.origen_dependencia,
            subsecretaria_direccion: db.subsecretaria_direccion,
            categoria: db.categoria,
            subcategoria: db.subcategoria,
            recursos: db.recursos,
            urls: db.urls,
            captura: db.captura,
            caratula: db.caratula,
            ticketera_interna: db.ticketera_interna,
            ticketera_externa: db.ticketera_externa,
            tier: db.tier,
            cantidad_recursos_asignados: db.cantidad_recursos_asignados,
            estado: db.estado,
            cliente_id: db.cliente_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
            staff: Vec::new(),
            cliente: None,
            tecnologias: None,
            backend_details: None,
            frontend_details: None,
            infraestructura: None,
            licencias: None,
            integraciones: Vec::new(),
        }
    }
}
