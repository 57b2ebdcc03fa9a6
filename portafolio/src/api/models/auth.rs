//! API request/response models for registration and login.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::Role;
use crate::api::validation::{Validate, is_valid_email};
use crate::types::UserId;

/// Missing fields are reported together, so every field is optional on the wire.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !(present(&self.nombre) && present(&self.email) && present(&self.password)) {
            return Err("All fields are required.".to_string());
        }
        if !self.email.as_deref().is_some_and(is_valid_email) {
            return Err("\"email\" must be a valid email".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if !(present(&self.email) && present(&self.password)) {
            return Err("Email and password are required.".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub id: UserId,
    pub nombre: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_all_fields() {
        let request: RegisterRequest = serde_json::from_str(r#"{"email": "a@b.com", "password": "x"}"#).unwrap();
        assert_eq!(request.validate().unwrap_err(), "All fields are required.");

        let request: RegisterRequest =
            serde_json::from_str(r#"{"nombre": "Ana", "email": "a@b.com", "password": "12345678"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_login_requires_credentials() {
        let request: LoginRequest = serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert_eq!(request.validate().unwrap_err(), "Email and password are required.");
    }
}
