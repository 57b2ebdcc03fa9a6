//! Database models for proyectos.

use crate::api::models::enums::{CategoriaProyecto, EstadoProyecto, SubcategoriaProyecto, Tier};
use crate::api::models::proyectos::ProyectoInput;
use crate::types::{ClienteId, ProyectoId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProyectoDBResponse {
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
    pub cliente_id: Option<ClienteId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully-mapped project row ready for insertion, built from a request body or a CSV row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProyectoCreateDBRequest {
    pub titulo_proyecto: String,
    pub proyecto_activo: bool,
    pub storyline: Option<String>,
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
    pub cliente_id: Option<ClienteId>,
}

impl From<&ProyectoInput> for ProyectoCreateDBRequest {
    fn from(input: &ProyectoInput) -> Self {
        Self {
            titulo_proyecto: input.titulo_proyecto.trim().to_string(),
            proyecto_activo: input.proyecto_activo.unwrap_or(false),
            storyline: input.storyline.clone().flatten(),
            origen_dependencia: input.origen_dependencia.clone().flatten(),
            subsecretaria_direccion: input.subsecretaria_direccion.clone().flatten(),
            categoria: input.categoria.flatten(),
            subcategoria: input.subcategoria.flatten(),
            recursos: input.recursos.clone().flatten(),
            urls: input.urls.clone().flatten().filter(|u| !u.is_empty()),
            captura: input.captura.clone().flatten(),
            caratula: input.caratula.clone().flatten(),
            ticketera_interna: input.ticketera_interna.clone().flatten(),
            ticketera_externa: input.ticketera_externa.clone().flatten(),
            tier: input.tier.flatten(),
            cantidad_recursos_asignados: input.cantidad_recursos_asignados.unwrap_or(0),
            estado: input.estado.flatten(),
            cliente_id: input.cliente_id.flatten(),
        }
    }
}
