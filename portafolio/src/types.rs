//! Common type definitions and permission system types.
//!
//! # ID Types
//!
//! All entity IDs are `SERIAL` integers wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`ProyectoId`]: Project identifier
//! - [`StaffId`]: Staff member identifier
//! - [`ClienteId`]: Client identifier
//! - [`IntegracionId`]: Integration identifier
//! - [`TecnologiasId`]: Technology profile identifier
//! - [`ChartId`]: Dashboard chart identifier
//!
//! # Permission System
//!
//! - [`Resource`]: What entity type is being accessed
//! - [`Operation`]: What action is being performed (Read, Create, Update, Delete)
//! - [`Permission`]: Authorization requirement combining resource and operation

use std::fmt;

pub type UserId = i32;
pub type ProyectoId = i32;
pub type StaffId = i32;
pub type ClienteId = i32;
pub type IntegracionId = i32;
pub type TecnologiasId = i32;
pub type ChartId = i32;

// Operations that can be performed on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    ReadAll,
    UpdateAll,
    DeleteAll,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Proyectos,
    Staff,
    Clientes,
    Integraciones,
    Tecnologias,
    Dashboard,
    DashboardConfig,
    Imports,
}

/// Authorization requirement reported when access is denied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    Allow(Resource, Operation),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll => write!(f, "Create"),
            Operation::ReadAll => write!(f, "Read"),
            Operation::UpdateAll => write!(f, "Update"),
            Operation::DeleteAll => write!(f, "Delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Users => "users",
            Resource::Proyectos => "proyectos",
            Resource::Staff => "staff",
            Resource::Clientes => "clientes",
            Resource::Integraciones => "integraciones",
            Resource::Tecnologias => "tecnologias",
            Resource::Dashboard => "dashboard",
            Resource::DashboardConfig => "dashboard-config",
            Resource::Imports => "imports",
        };
        f.write_str(name)
    }
}
