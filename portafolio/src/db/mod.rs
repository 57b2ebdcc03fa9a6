//! Database layer for data persistence and access.
//!
//! Built on SQLx with PostgreSQL, following the Repository pattern:
//!
//! ```text
//! API handlers → db::handlers (repositories) → db::models (rows) → PostgreSQL
//! ```
//!
//! - [`handlers`]: repositories, one per table or table family
//! - [`models`]: row structs matching the table schemas
//! - [`errors`]: [`errors::DbError`], the classified `sqlx::Error`
//!
//! Repositories borrow a connection. Reads can use a pooled connection
//! directly; multi-statement writes open a transaction inside the repository
//! method so callers never see a half-applied change.
//!
//! Migrations live in `migrations/` and are embedded through
//! [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
