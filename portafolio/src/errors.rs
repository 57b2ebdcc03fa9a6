use crate::db::errors::DbError;
use crate::types::{Operation, Permission};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// A bearer token was presented but failed verification
    #[error("Invalid token")]
    InvalidToken,

    /// User lacks required permissions for the operation
    #[error("Insufficient permissions to {action} {resource}")]
    InsufficientPermissions {
        required: Permission,
        action: Operation,
        resource: String,
    },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// The request body could not be decoded into the expected shape
    #[error("Validation failed: {details:?}")]
    Validation { details: Vec<String> },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// Conflict error, e.g., for unique constraint violations
    #[error("Conflict: {message}")]
    Conflict { message: String, field: Option<String> },

    /// A CSV import was rejected or rolled back; nothing was written
    #[error("Import failed: {0:#}")]
    ImportFailed(anyhow::Error),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } | Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::ImportFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "No token provided.".to_string()),
            Error::InvalidToken => "Invalid token.".to_string(),
            Error::InsufficientPermissions { .. } => "Forbidden".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Validation { .. } => "Validation failed.".to_string(),
            Error::NotFound { resource, .. } => format!("{resource} not found"),
            Error::Internal { .. } => "An internal server error occurred.".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "The requested record was not found.".to_string(),
                DbError::UniqueViolation { .. } => "A record with this value already exists.".to_string(),
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource.".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided.".to_string(),
                DbError::Other(_) => "An internal server error occurred.".to_string(),
            },
            Error::Other(_) => "An internal server error occurred.".to_string(),
            Error::Conflict { message, .. } => message.clone(),
            Error::ImportFailed(_) => "Ocurrió un error durante la importación.".to_string(),
        }
    }

    fn body(&self) -> ErrorBody {
        let (details, field) = match self {
            Error::Validation { details } => (Some(details.clone()), None),
            Error::Conflict { field, .. } => (None, field.clone()),
            Error::Database(DbError::UniqueViolation { field, .. }) => (None, field.clone()),
            _ => (None, None),
        };
        ErrorBody {
            error: self.user_message(),
            details,
            field,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) | Error::ImportFailed(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InvalidToken | Error::InsufficientPermissions { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::Validation { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
