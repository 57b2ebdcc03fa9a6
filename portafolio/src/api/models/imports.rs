//! API models for CSV imports.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
}

impl ImportResponse {
    pub fn proyectos(created: usize) -> Self {
        Self {
            message: format!("Importación completada. Se crearon {created} nuevos proyectos."),
        }
    }

    pub fn staff(created: usize) -> Self {
        Self {
            message: format!("Importación completada. Se crearon {created} nuevos registros de staff."),
        }
    }
}
