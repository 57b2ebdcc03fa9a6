//! Database models for staff.

use crate::api::models::enums::{ExperienciaStaff, ModalidadStaff, RolStaff};
use crate::api::models::staff::StaffInput;
use crate::types::{ProyectoId, StaffId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffDBResponse {
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

/// A staff row joined through `proyecto_staff`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffLink {
    pub proyecto_id: ProyectoId,
    #[sqlx(flatten)]
    pub staff: StaffDBResponse,
}

/// A fully-mapped staff row ready for insertion, built from a request body or a CSV row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffCreateDBRequest {
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
}

impl From<&StaffInput> for StaffCreateDBRequest {
    fn from(input: &StaffInput) -> Self {
        Self {
            nombre_completo: input.nombre_completo.trim().to_string(),
            contrato: input.contrato.clone().flatten(),
            rol: input.rol.flatten(),
            nombres: input.nombres.clone().flatten(),
            apellidos: input.apellidos.clone().flatten(),
            activo: input.activo.flatten(),
            comentario: input.comentario.clone().flatten(),
            modalidad: input.modalidad.flatten(),
            experiencia: input.experiencia.flatten(),
            origen: input.origen.clone().flatten(),
            email: input.email.clone().flatten().filter(|e| !e.is_empty()),
            skills: input.skills.clone().flatten(),
            desempeno_ley_dto: input.desempeno_ley_dto.clone().flatten(),
            hhee: input.hhee.clone().flatten(),
            ur: input.ur.clone().flatten(),
            coordinacion: input.coordinacion.clone().flatten(),
            presencialidad: input.presencialidad.clone().flatten(),
            cumpleanos: input.cumpleanos.clone().flatten(),
            edad: input.edad.flatten(),
        }
    }
}
