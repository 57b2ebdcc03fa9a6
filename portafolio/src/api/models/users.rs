//! API request/response models for users.

use super::enums::DomainEnum;
use super::pagination::Pagination;
use crate::api::validation::{Validate, is_valid_email, require_non_empty};
use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Access level of an account. Ordered: every role includes the ones before it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    /// ADMIN or SUPERADMIN
    pub fn is_admin(self) -> bool {
        self >= Role::Admin
    }

    pub fn is_super_admin(self) -> bool {
        self == Role::Superadmin
    }
}

impl DomainEnum for Role {
    const NAME: &'static str = "Role";
    const ALL: &'static [Self] = &[Role::User, Role::Admin, Role::Superadmin];

    fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Superadmin => "SUPERADMIN",
        }
    }
}

// User request models
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCreate {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("nombre", &self.nombre)?;
        if !is_valid_email(&self.email) {
            return Err("\"email\" must be a valid email".to_string());
        }
        require_non_empty("password", &self.password)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Only a SUPERADMIN may change roles
    pub role: Option<Role>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), String> {
        if let Some(nombre) = &self.nombre {
            require_non_empty("nombre", nombre)?;
        }
        if self.email.as_deref().is_some_and(|email| !is_valid_email(email)) {
            return Err("\"email\" must be a valid email".to_string());
        }
        if let Some(password) = &self.password {
            require_non_empty("password", password)?;
        }
        Ok(())
    }
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub nombre: String,
    pub email: String,
    pub role: Role,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on nombre or email
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersListResponse {
    pub users: Vec<UserResponse>,
    pub total_count: i64,
}

/// The authenticated caller, as carried in the session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub nombre: String,
    pub role: Role,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            email: db.email,
            role: db.role,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            nombre: db.nombre,
            role: db.role,
        }
    }
}
