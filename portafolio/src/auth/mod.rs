//! Authentication and authorization.
//!
//! Callers log in through `/api/auth/login` and receive an HS256 JWT. Every
//! protected route reads it from `Authorization: Bearer <jwt>`; there is no
//! server-side session.
//!
//! - [`current_user`]: the [`CurrentUser`](crate::api::models::users::CurrentUser) extractor
//! - [`permissions`]: the role matrix and the `RequiresPermission` extractor
//! - [`password`]: Argon2id hashing, run on the blocking pool
//! - [`session`]: token claims, signing and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
