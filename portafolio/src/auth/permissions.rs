//! Role-based access control.
//!
//! Access is decided by a static matrix of (resource, operation) to the
//! minimum [`Role`] allowed to perform it. Handlers declare what they need
//! through the [`RequiresPermission`] extractor:
//!
//! ```ignore
//! async fn delete_user(
//!     current_user: RequiresPermission<resource::Users, operation::DeleteAll>,
//!     ...
//! ) -> Result<StatusCode> { ... }
//! ```

use std::marker::PhantomData;
use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
    types::{Operation, Permission, Resource},
};

/// Minimum role for `operation` on `resource`, or `None` when nobody may.
pub fn required_role(resource: Resource, operation: Operation) -> Option<Role> {
    use Operation::*;
    use Resource::*;

    match (resource, operation) {
        (Proyectos | Staff | Clientes | Integraciones | Tecnologias, _) => Some(Role::User),
        (Dashboard | DashboardConfig, ReadAll) => Some(Role::User),
        (Dashboard | DashboardConfig, CreateAll | UpdateAll | DeleteAll) => Some(Role::Admin),
        (Users, DeleteAll) => Some(Role::Superadmin),
        (Users, _) => Some(Role::Admin),
        (Imports, DeleteAll) => None,
        (Imports, _) => Some(Role::Admin),
    }
}

pub fn has_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    required_role(resource, operation).is_some_and(|role| user.role >= role)
}

/// ADMIN or SUPERADMIN
pub fn check_admin(user: &CurrentUser) -> bool {
    user.role.is_admin()
}

pub fn check_super_admin(user: &CurrentUser) -> bool {
    user.role.is_super_admin()
}

/// Type-level resource markers for [`RequiresPermission`].
pub mod resource {
    use crate::types::Resource;

    pub trait ResourceMarker: Send + Sync {
        const RESOURCE: Resource;
    }

    macro_rules! markers {
        ($($name:ident),* $(,)?) => {
            $(
                pub struct $name;
                impl ResourceMarker for $name {
                    const RESOURCE: Resource = Resource::$name;
                }
            )*
        };
    }

    markers!(Users, Proyectos, Staff, Clientes, Integraciones, Tecnologias, Dashboard, DashboardConfig, Imports);
}

/// Type-level operation markers for [`RequiresPermission`].
pub mod operation {
    use crate::types::Operation;

    pub trait OperationMarker: Send + Sync {
        const OPERATION: Operation;
    }

    macro_rules! markers {
        ($($name:ident),* $(,)?) => {
            $(
                pub struct $name;
                impl OperationMarker for $name {
                    const OPERATION: Operation = Operation::$name;
                }
            )*
        };
    }

    markers!(CreateAll, ReadAll, UpdateAll, DeleteAll);
}

/// Extractor that authenticates the caller and checks one matrix entry.
/// Derefs to the authenticated [`CurrentUser`].
pub struct RequiresPermission<R, O> {
    user: CurrentUser,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> RequiresPermission<R, O> {
    pub fn into_inner(self) -> CurrentUser {
        self.user
    }
}

impl<R, O> Deref for RequiresPermission<R, O> {
    type Target = CurrentUser;

    fn deref(&self) -> &CurrentUser {
        &self.user
    }
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: resource::ResourceMarker,
    O: operation::OperationMarker,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !has_permission(&user, R::RESOURCE, O::OPERATION) {
            return Err(Error::InsufficientPermissions {
                required: Permission::Allow(R::RESOURCE, O::OPERATION),
                action: O::OPERATION,
                resource: R::RESOURCE.to_string(),
            });
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}
