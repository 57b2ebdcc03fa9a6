//! Database record models matching table schemas.
//!
//! Each `*DBResponse` derives `sqlx::FromRow` and mirrors one table. Request
//! structs exist only where the stored shape differs from what the API
//! accepts (hashed passwords, rows mapped out of a CSV file); elsewhere the
//! repositories take the validated API input directly.

pub mod clientes;
pub mod dashboard;
pub mod detalles;
pub mod integraciones;
pub mod proyectos;
pub mod staff;
pub mod tecnologias;
pub mod users;
