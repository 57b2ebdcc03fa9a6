//! CSV templates and row mapping for the bulk imports under `/api/admin`.
//!
//! Templates are a single header row with every field quoted. Imports read
//! rows by header name, so column order does not matter and unknown columns
//! are ignored. Enum columns are lenient: an unrecognised value becomes NULL
//! rather than failing the import.

use serde::Deserialize;
use thiserror::Error;

use crate::api::models::enums::{
    CategoriaProyecto, DomainEnum, ExperienciaStaff, ModalidadStaff, RolStaff, SubcategoriaProyecto, Tier,
};
use crate::db::models::{proyectos::ProyectoCreateDBRequest, staff::StaffCreateDBRequest};

pub const PROYECTOS_TEMPLATE_FILENAME: &str = "plantilla_proyectos.csv";
pub const STAFF_TEMPLATE_FILENAME: &str = "plantilla_staff.csv";

pub const PROYECTOS_HEADERS: [&str; 16] = [
    "titulo_proyecto",
    "proyecto_activo",
    "storyline",
    "origen_dependencia",
    "subsecretaria_direccion",
    "categoria",
    "subcategoria",
    "recursos",
    "urls",
    "captura",
    "caratula",
    "ticketera_interna",
    "ticketera_externa",
    "tier",
    "cantidad_recursos_asignados",
    "clienteId",
];

pub const STAFF_HEADERS: [&str; 19] = [
    "nombre_completo",
    "contrato",
    "rol",
    "nombres",
    "apellidos",
    "activo",
    "comentario",
    "modalidad",
    "experiencia",
    "origen",
    "email",
    "skills",
    "desempeno_ley_dto",
    "hhee",
    "ur",
    "coordinacion",
    "presencialidad",
    "cumpleanos",
    "edad",
];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {field} is required")]
    MissingField { row: usize, field: &'static str },
}

/// A header-only CSV with every field quoted.
pub fn template(headers: &[&str]) -> Result<String, ImportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    let bytes = writer.into_inner().map_err(|e| ImportError::Csv(e.into_error().into()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProyectoRow {
    titulo_proyecto: Option<String>,
    proyecto_activo: Option<String>,
    storyline: Option<String>,
    origen_dependencia: Option<String>,
    subsecretaria_direccion: Option<String>,
    categoria: Option<String>,
    subcategoria: Option<String>,
    recursos: Option<String>,
    urls: Option<String>,
    captura: Option<String>,
    caratula: Option<String>,
    ticketera_interna: Option<String>,
    ticketera_externa: Option<String>,
    tier: Option<String>,
    cantidad_recursos_asignados: Option<String>,
    #[serde(rename = "clienteId")]
    cliente_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StaffRow {
    nombre_completo: Option<String>,
    contrato: Option<String>,
    rol: Option<String>,
    nombres: Option<String>,
    apellidos: Option<String>,
    activo: Option<String>,
    comentario: Option<String>,
    modalidad: Option<String>,
    experiencia: Option<String>,
    origen: Option<String>,
    email: Option<String>,
    skills: Option<String>,
    desempeno_ley_dto: Option<String>,
    hhee: Option<String>,
    ur: Option<String>,
    coordinacion: Option<String>,
    presencialidad: Option<String>,
    cumpleanos: Option<String>,
    edad: Option<String>,
}

fn reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_reader(data)
}

/// Trimmed, with empty cells as `None`.
fn text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Leading integer of a cell, so "29 años" reads as 29.
fn int(value: Option<&str>) -> Option<i32> {
    let v = value?.trim();
    let sign_len = usize::from(v.starts_with(|c| c == '-' || c == '+'));
    let digits = v[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    v[..sign_len + digits].parse().ok()
}

fn exact<T: DomainEnum>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| T::parse(v.trim()))
}

fn required(value: Option<String>, row: usize, field: &'static str) -> Result<String, ImportError> {
    text(value).ok_or(ImportError::MissingField { row, field })
}

pub fn parse_proyectos(data: &[u8]) -> Result<Vec<ProyectoCreateDBRequest>, ImportError> {
    let mut rows = Vec::new();
    for (index, record) in reader(data).deserialize::<ProyectoRow>().enumerate() {
        let row = record?;
        rows.push(ProyectoCreateDBRequest {
            titulo_proyecto: required(row.titulo_proyecto, index + 1, "titulo_proyecto")?,
            proyecto_activo: is_true(row.proyecto_activo.as_deref()),
            categoria: exact::<CategoriaProyecto>(row.categoria.as_deref()),
            subcategoria: exact::<SubcategoriaProyecto>(row.subcategoria.as_deref()),
            tier: exact::<Tier>(row.tier.as_deref()),
            cantidad_recursos_asignados: int(row.cantidad_recursos_asignados.as_deref()).unwrap_or(0),
            cliente_id: int(row.cliente_id.as_deref()),
            storyline: text(row.storyline),
            origen_dependencia: text(row.origen_dependencia),
            subsecretaria_direccion: text(row.subsecretaria_direccion),
            recursos: text(row.recursos),
            urls: text(row.urls),
            captura: text(row.captura),
            caratula: text(row.caratula),
            ticketera_interna: text(row.ticketera_interna),
            ticketera_externa: text(row.ticketera_externa),
            estado: None,
        });
    }
    Ok(rows)
}

/// Free-text role as typed in spreadsheets ("Dev Backend", "DevOps", "UX/UI").
pub fn fuzzy_rol(value: &str) -> Option<RolStaff> {
    let v = value.trim().to_lowercase();
    // "devops" also contains "dev"
    if v.contains("devops") {
        Some(RolStaff::DevOps)
    } else if v.contains("dev") {
        Some(RolStaff::Developer)
    } else if v.contains("qa") {
        Some(RolStaff::Qa)
    } else if v.contains("pm") {
        Some(RolStaff::Pm)
    } else if v.contains("design") || v.contains("diseño") || v.contains("ux/ui") {
        Some(RolStaff::Designer)
    } else {
        None
    }
}

pub fn fuzzy_modalidad(value: &str) -> Option<ModalidadStaff> {
    let v = value.trim().to_lowercase();
    if v.contains("full") {
        Some(ModalidadStaff::FullTime)
    } else if v.contains("part") {
        Some(ModalidadStaff::PartTime)
    } else if v.contains("contractor") {
        Some(ModalidadStaff::Contractor)
    } else {
        None
    }
}

pub fn fuzzy_experiencia(value: &str) -> Option<ExperienciaStaff> {
    let v = value.trim().to_lowercase();
    // Mid before Senior: "semisr" and "semi-sr" contain "sr"
    if v.contains("jr") || v.contains("junior") {
        Some(ExperienciaStaff::Junior)
    } else if v.contains("mid") || v.contains("semisr") || v.contains("semi-sr") {
        Some(ExperienciaStaff::Mid)
    } else if v.contains("sr") || v.contains("senior") {
        Some(ExperienciaStaff::Senior)
    } else {
        None
    }
}

pub fn parse_staff(data: &[u8]) -> Result<Vec<StaffCreateDBRequest>, ImportError> {
    let mut rows = Vec::new();
    for (index, record) in reader(data).deserialize::<StaffRow>().enumerate() {
        let row = record?;
        rows.push(StaffCreateDBRequest {
            nombre_completo: required(row.nombre_completo, index + 1, "nombre_completo")?,
            rol: row.rol.as_deref().and_then(fuzzy_rol),
            modalidad: row.modalidad.as_deref().and_then(fuzzy_modalidad),
            experiencia: row.experiencia.as_deref().and_then(fuzzy_experiencia),
            activo: Some(is_true(row.activo.as_deref())),
            edad: int(row.edad.as_deref()),
            contrato: text(row.contrato),
            nombres: text(row.nombres),
            apellidos: text(row.apellidos),
            comentario: text(row.comentario),
            origen: text(row.origen),
            email: text(row.email),
            skills: text(row.skills),
            desempeno_ley_dto: text(row.desempeno_ley_dto),
            hhee: text(row.hhee),
            ur: text(row.ur),
            coordinacion: text(row.coordinacion),
            presencialidad: text(row.presencialidad),
            cumpleanos: text(row.cumpleanos),
        });
    }
    Ok(rows)
}
