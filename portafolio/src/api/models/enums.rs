//! Enumerated field types shared by the API, the database and CSV imports.
//!
//! Every enum maps onto a PostgreSQL enum type of the same name and
//! serializes to the exact label stored in the database.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Closed set of labels with a canonical string form.
pub trait DomainEnum: Sized + Copy + 'static {
    /// Name used when listing values (e.g. in `/api/proyectos/enums`)
    const NAME: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Exact, case-sensitive lookup by label.
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }
}

/// Error for labels outside a [`DomainEnum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnumValue {
    pub enum_name: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}

impl fmt::Display for InvalidEnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} value '{}', expected one of: {}",
            self.enum_name,
            self.value,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for InvalidEnumValue {}

/// Lookup that reports the allowed labels on failure.
pub fn parse_label<T: DomainEnum>(value: &str) -> Result<T, InvalidEnumValue> {
    T::parse(value).ok_or_else(|| InvalidEnumValue {
        enum_name: T::NAME,
        value: value.to_string(),
        allowed: T::labels(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "tier", rename_all = "UPPERCASE")]
pub enum Tier {
    Uno,
    Dos,
    Tres,
    Cuatro,
    Cinco,
}

impl DomainEnum for Tier {
    const NAME: &'static str = "Tier";
    const ALL: &'static [Self] = &[Tier::Uno, Tier::Dos, Tier::Tres, Tier::Cuatro, Tier::Cinco];

    fn as_str(&self) -> &'static str {
        match self {
            Tier::Uno => "UNO",
            Tier::Dos => "DOS",
            Tier::Tres => "TRES",
            Tier::Cuatro => "CUATRO",
            Tier::Cinco => "CINCO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "categoria_proyecto")]
pub enum CategoriaProyecto {
    Aplicativo,
    Servicio,
    Sistema,
    Plataforma,
    Formulario,
    Registro,
    Tableros,
    #[serde(rename = "APP_Mobile")]
    #[sqlx(rename = "APP_Mobile")]
    AppMobile,
    Microservicio,
    #[serde(rename = "API")]
    #[sqlx(rename = "API")]
    Api,
    Otra,
}

impl DomainEnum for CategoriaProyecto {
    const NAME: &'static str = "CategoriaProyecto";
    const ALL: &'static [Self] = &[
        CategoriaProyecto::Aplicativo,
        CategoriaProyecto::Servicio,
        CategoriaProyecto::Sistema,
        CategoriaProyecto::Plataforma,
        CategoriaProyecto::Formulario,
        CategoriaProyecto::Registro,
        CategoriaProyecto::Tableros,
        CategoriaProyecto::AppMobile,
        CategoriaProyecto::Microservicio,
        CategoriaProyecto::Api,
        CategoriaProyecto::Otra,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            CategoriaProyecto::Aplicativo => "Aplicativo",
            CategoriaProyecto::Servicio => "Servicio",
            CategoriaProyecto::Sistema => "Sistema",
            CategoriaProyecto::Plataforma => "Plataforma",
            CategoriaProyecto::Formulario => "Formulario",
            CategoriaProyecto::Registro => "Registro",
            CategoriaProyecto::Tableros => "Tableros",
            CategoriaProyecto::AppMobile => "APP_Mobile",
            CategoriaProyecto::Microservicio => "Microservicio",
            CategoriaProyecto::Api => "API",
            CategoriaProyecto::Otra => "Otra",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "subcategoria_proyecto", rename_all = "snake_case")]
pub enum SubcategoriaProyecto {
    Web,
    Mobile,
    Cms,
    Monitor,
    Procesos,
    EnvioMasivo,
    Datos,
    Plataforma,
    Asesoramiento,
    Otra,
}

impl DomainEnum for SubcategoriaProyecto {
    const NAME: &'static str = "SubcategoriaProyecto";
    const ALL: &'static [Self] = &[
        SubcategoriaProyecto::Web,
        SubcategoriaProyecto::Mobile,
        SubcategoriaProyecto::Cms,
        SubcategoriaProyecto::Monitor,
        SubcategoriaProyecto::Procesos,
        SubcategoriaProyecto::EnvioMasivo,
        SubcategoriaProyecto::Datos,
        SubcategoriaProyecto::Plataforma,
        SubcategoriaProyecto::Asesoramiento,
        SubcategoriaProyecto::Otra,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SubcategoriaProyecto::Web => "web",
            SubcategoriaProyecto::Mobile => "mobile",
            SubcategoriaProyecto::Cms => "cms",
            SubcategoriaProyecto::Monitor => "monitor",
            SubcategoriaProyecto::Procesos => "procesos",
            SubcategoriaProyecto::EnvioMasivo => "envio_masivo",
            SubcategoriaProyecto::Datos => "datos",
            SubcategoriaProyecto::Plataforma => "plataforma",
            SubcategoriaProyecto::Asesoramiento => "asesoramiento",
            SubcategoriaProyecto::Otra => "otra",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rol_staff")]
pub enum RolStaff {
    Developer,
    #[serde(rename = "QA")]
    #[sqlx(rename = "QA")]
    Qa,
    #[serde(rename = "PM")]
    #[sqlx(rename = "PM")]
    Pm,
    Designer,
    DevOps,
}

impl DomainEnum for RolStaff {
    const NAME: &'static str = "RolStaff";
    const ALL: &'static [Self] = &[RolStaff::Developer, RolStaff::Qa, RolStaff::Pm, RolStaff::Designer, RolStaff::DevOps];

    fn as_str(&self) -> &'static str {
        match self {
            RolStaff::Developer => "Developer",
            RolStaff::Qa => "QA",
            RolStaff::Pm => "PM",
            RolStaff::Designer => "Designer",
            RolStaff::DevOps => "DevOps",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "modalidad_staff")]
pub enum ModalidadStaff {
    #[serde(rename = "Full_time")]
    #[sqlx(rename = "Full_time")]
    FullTime,
    #[serde(rename = "Part_time")]
    #[sqlx(rename = "Part_time")]
    PartTime,
    Contractor,
}

impl DomainEnum for ModalidadStaff {
    const NAME: &'static str = "ModalidadStaff";
    const ALL: &'static [Self] = &[ModalidadStaff::FullTime, ModalidadStaff::PartTime, ModalidadStaff::Contractor];

    fn as_str(&self) -> &'static str {
        match self {
            ModalidadStaff::FullTime => "Full_time",
            ModalidadStaff::PartTime => "Part_time",
            ModalidadStaff::Contractor => "Contractor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "experiencia_staff")]
pub enum ExperienciaStaff {
    Junior,
    Mid,
    Senior,
}

impl DomainEnum for ExperienciaStaff {
    const NAME: &'static str = "ExperienciaStaff";
    const ALL: &'static [Self] = &[ExperienciaStaff::Junior, ExperienciaStaff::Mid, ExperienciaStaff::Senior];

    fn as_str(&self) -> &'static str {
        match self {
            ExperienciaStaff::Junior => "Junior",
            ExperienciaStaff::Mid => "Mid",
            ExperienciaStaff::Senior => "Senior",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_proyecto")]
pub enum EstadoProyecto {
    Activo,
    Inactivo,
    #[serde(rename = "En_Desarrollo")]
    #[sqlx(rename = "En_Desarrollo")]
    EnDesarrollo,
    Mantenimiento,
}

impl DomainEnum for EstadoProyecto {
    const NAME: &'static str = "EstadoProyecto";
    const ALL: &'static [Self] = &[
        EstadoProyecto::Activo,
        EstadoProyecto::Inactivo,
        EstadoProyecto::EnDesarrollo,
        EstadoProyecto::Mantenimiento,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            EstadoProyecto::Activo => "Activo",
            EstadoProyecto::Inactivo => "Inactivo",
            EstadoProyecto::EnDesarrollo => "En_Desarrollo",
            EstadoProyecto::Mantenimiento => "Mantenimiento",
        }
    }
}

/// Chart renderings supported by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "camelCase")]
#[sqlx(type_name = "chart_type", rename_all = "camelCase")]
pub enum ChartType {
    Bar,
    Pie,
    Line,
    Doughnut,
    PolarArea,
}

impl DomainEnum for ChartType {
    const NAME: &'static str = "ChartType";
    const ALL: &'static [Self] = &[
        ChartType::Bar,
        ChartType::Pie,
        ChartType::Line,
        ChartType::Doughnut,
        ChartType::PolarArea,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Line => "line",
            ChartType::Doughnut => "doughnut",
            ChartType::PolarArea => "polarArea",
        }
    }
}

/// Every enum keyed by name, as served by `GET /api/proyectos/enums`.
pub fn catalog() -> BTreeMap<&'static str, Vec<&'static str>> {
    use crate::api::models::users::Role;

    BTreeMap::from([
        (Tier::NAME, Tier::labels()),
        (CategoriaProyecto::NAME, CategoriaProyecto::labels()),
        (SubcategoriaProyecto::NAME, SubcategoriaProyecto::labels()),
        (RolStaff::NAME, RolStaff::labels()),
        (ModalidadStaff::NAME, ModalidadStaff::labels()),
        (ExperienciaStaff::NAME, ExperienciaStaff::labels()),
        (EstadoProyecto::NAME, EstadoProyecto::labels()),
        (ChartType::NAME, ChartType::labels()),
        (Role::NAME, Role::labels()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_serde() {
        for value in CategoriaProyecto::ALL {
            let json = serde_json::to_value(value).unwrap();
            assert_eq!(json, value.as_str());
        }
        for value in ModalidadStaff::ALL {
            let json = serde_json::to_value(value).unwrap();
            assert_eq!(json, value.as_str());
        }
        assert_eq!(serde_json::to_value(ChartType::PolarArea).unwrap(), "polarArea");
        assert_eq!(serde_json::to_value(SubcategoriaProyecto::EnvioMasivo).unwrap(), "envio_masivo");
        assert_eq!(serde_json::to_value(Tier::Cuatro).unwrap(), "CUATRO");
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Tier::parse("DOS"), Some(Tier::Dos));
        assert_eq!(Tier::parse("dos"), None);
        assert_eq!(parse_label::<CategoriaProyecto>("APP_Mobile").unwrap(), CategoriaProyecto::AppMobile);

        let err = parse_label::<ChartType>("scatter").unwrap_err();
        assert!(err.to_string().contains("polarArea"));
    }

    #[test]
    fn test_catalog_contains_every_enum() {
        let catalog = catalog();
        for key in [
            "Tier",
            "CategoriaProyecto",
            "SubcategoriaProyecto",
            "RolStaff",
            "ModalidadStaff",
            "ExperienciaStaff",
            "EstadoProyecto",
            "ChartType",
            "Role",
        ] {
            assert!(catalog.contains_key(key), "missing {key}");
        }
        assert_eq!(catalog["Role"], vec!["USER", "ADMIN", "SUPERADMIN"]);
        assert_eq!(catalog["RolStaff"].len(), 5);
    }
}
