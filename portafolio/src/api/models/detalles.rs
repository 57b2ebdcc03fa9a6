//! Bodies for the one-to-one project detail upserts. Every field is
//! optional; the stored row is replaced by whatever the body carries.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use super::fields::optional_date;
use crate::api::validation::{Validate, optional_uri};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BackendDetailsInput {
    pub lenguaje: Option<String>,
    pub framework: Option<String>,
    pub version: Option<String>,
    pub base_datos: Option<String>,
    pub orm: Option<String>,
    pub repositorio: Option<String>,
    pub observaciones: Option<String>,
}

impl Validate for BackendDetailsInput {
    fn validate(&self) -> Result<(), String> {
        optional_uri("repositorio", self.repositorio.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FrontendDetailsInput {
    pub framework: Option<String>,
    pub version: Option<String>,
    pub lenguaje: Option<String>,
    pub libreria_ui: Option<String>,
    pub repositorio: Option<String>,
    pub observaciones: Option<String>,
}

impl Validate for FrontendDetailsInput {
    fn validate(&self) -> Result<(), String> {
        optional_uri("repositorio", self.repositorio.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InfraestructuraInput {
    pub proveedor: Option<String>,
    pub servidor: Option<String>,
    pub sistema_operativo: Option<String>,
    pub dominio: Option<String>,
    pub ambiente: Option<String>,
    pub observaciones: Option<String>,
}

impl Validate for InfraestructuraInput {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LicenciasInput {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub proveedor: Option<String>,
    /// `YYYY-MM-DD`; `""` is treated as null
    #[serde(default, deserialize_with = "optional_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub fecha_vencimiento: Option<NaiveDate>,
    pub costo: Option<String>,
    pub observaciones: Option<String>,
}

impl Validate for LicenciasInput {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
