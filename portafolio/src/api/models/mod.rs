//! API request and response data models.
//!
//! These structures define the public JSON contract. They are kept apart from
//! the database rows in [`crate::db::models`] so either side can change
//! without dragging the other along. Everything is annotated with `utoipa`
//! for the generated OpenAPI document.
//!
//! - [`enums`], [`fields`] and [`pagination`] hold the shared building blocks:
//!   domain enums, tri-state deserializers and page/pageSize handling.
//! - [`auth`] and [`users`] cover accounts and login.
//! - [`proyectos`], [`staff`], [`clientes`], [`integraciones`],
//!   [`tecnologias`] and [`detalles`] cover the portfolio records.
//! - [`dashboard`] covers statistics and chart configuration.
//! - [`imports`] covers CSV import results.

pub mod auth;
pub mod clientes;
pub mod dashboard;
pub mod detalles;
pub mod enums;
pub mod fields;
pub mod imports;
pub mod integraciones;
pub mod pagination;
pub mod proyectos;
pub mod staff;
pub mod tecnologias;
pub mod users;
