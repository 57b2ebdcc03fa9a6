//! HTTP API: route handlers, request/response models and body validation.
//!
//! - **[`handlers`]**: Axum route handlers, one module per resource
//! - **[`models`]**: the JSON contract, kept apart from database rows
//! - **[`validation`]**: body extraction plus field checks that run before any query
//!
//! Everything is mounted under `/api`:
//!
//! - **Auth** (`/api/auth/*`): registration and login, no token required
//! - **Portfolio** (`/api/proyectos`, `/api/staff`, `/api/clientes`,
//!   `/api/integraciones`, `/api/tecnologias`)
//! - **Accounts** (`/api/users`)
//! - **Dashboard** (`/api/dashboard/*`, `/api/dashboard-config`)
//! - **CSV import** (`/api/admin/*`)
//!
//! The OpenAPI document is served at `/api/docs`.

pub mod handlers;
pub mod models;
pub mod validation;
