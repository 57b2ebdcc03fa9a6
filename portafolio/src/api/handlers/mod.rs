//! HTTP request handlers, one module per resource.
//!
//! Each handler validates its input, checks access through the
//! [`RequiresPermission`](crate::auth::permissions::RequiresPermission)
//! extractor, calls the repositories and shapes the response. Failures are
//! returned as [`crate::errors::Error`], which renders the JSON error body.

pub mod admin;
pub mod auth;
pub mod clientes;
pub mod dashboard;
pub mod dashboard_config;
pub mod health;
pub mod integraciones;
pub mod proyectos;
pub mod staff;
pub mod tecnologias;
pub mod users;

use crate::db::errors::DbError;
use crate::errors::Error;

/// Map a repository miss onto a 404 naming the resource; other database
/// errors pass through unchanged.
pub(crate) fn or_not_found(resource: &'static str, id: i32) -> impl FnOnce(DbError) -> Error {
    move |e| match e {
        DbError::NotFound => Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    }
}

pub(crate) fn not_found(resource: &'static str, id: i32) -> Error {
    Error::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}
