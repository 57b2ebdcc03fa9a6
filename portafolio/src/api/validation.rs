//! Request validation at the HTTP boundary.
//!
//! Handlers take `body: Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_validated_json`], which turns decoding failures into a
//! "Validation failed." response and field-level failures into a 400 carrying
//! the first message.

use axum::{Json, extract::rejection::JsonRejection};

use crate::errors::Error;

/// Field-level constraints checked after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub fn extract_validated_json<T: Validate>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    let Json(value) = extract_json(body)?;
    value.validate().map_err(|message| Error::BadRequest { message })?;
    Ok(value)
}

/// Decode without field-level checks.
pub fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<Json<T>, Error> {
    body.map_err(|rejection| Error::Validation {
        details: vec![rejection.body_text()],
    })
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("\"{field}\" is not allowed to be empty"));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: Option<i32>) -> Result<(), String> {
    match value {
        Some(v) if v < 0 => Err(format!("\"{field}\" must be greater than or equal to 0")),
        _ => Ok(()),
    }
}

/// Accepts `null`/absent and `""`; anything else must look like an address.
pub fn optional_email(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_empty() && !is_valid_email(v) => Err(format!("\"{field}\" must be a valid email")),
        _ => Ok(()),
    }
}

/// Accepts `null`/absent and `""`; anything else must be an absolute URI.
pub fn optional_uri(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_empty() && url::Url::parse(v).is_err() => Err(format!("\"{field}\" must be a valid uri")),
        _ => Ok(()),
    }
}

/// A single `@` separating a non-empty local part from a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("ana.perez+tag@gob.example.ar"));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@@example.com"));
        assert!(!is_valid_email("ana @example.com"));
        assert!(!is_valid_email("ana@example..com"));
    }

    #[test]
    fn test_optional_email_allows_blank() {
        assert!(optional_email("email", None).is_ok());
        assert!(optional_email("email", Some("")).is_ok());
        assert!(optional_email("email", Some("nope")).is_err());
    }

    #[test]
    fn test_optional_uri() {
        assert!(optional_uri("urls", Some("https://portal.example.com/app")).is_ok());
        assert!(optional_uri("urls", Some("")).is_ok());
        assert_eq!(
            optional_uri("urls", Some("not a url")).unwrap_err(),
            "\"urls\" must be a valid uri"
        );
    }

    #[test]
    fn test_non_empty_and_non_negative() {
        assert!(require_non_empty("nombre", "  ").is_err());
        assert!(require_non_empty("nombre", "Ana").is_ok());
        assert!(require_non_negative("edad", Some(-1)).is_err());
        assert!(require_non_negative("edad", Some(0)).is_ok());
        assert!(require_non_negative("edad", None).is_ok());
    }
}
