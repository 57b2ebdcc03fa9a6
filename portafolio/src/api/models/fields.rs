//! Deserializers for partially-updatable fields.
//!
//! Optional fields are tri-state: absent leaves the stored value alone, `null`
//! clears it, and a value replaces it. That maps onto `Option<Option<T>>`
//! paired with `#[serde(default)]`, so a field that never shows up stays `None`.
//! Plain values use `serde_with::rust::double_option`; the helpers below cover
//! enum labels and dates, which also accept `""` as a synonym for `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

use super::enums::{DomainEnum, parse_label};

/// An enum label, `null` or `""`.
pub fn nullable_enum<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DomainEnum,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(s) if s.is_empty() => Ok(Some(None)),
        Some(s) => parse_label::<T>(&s).map(|v| Some(Some(v))).map_err(D::Error::custom),
    }
}

/// A required enum label.
pub fn required_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DomainEnum,
{
    let s = String::deserialize(deserializer)?;
    parse_label::<T>(&s).map_err(D::Error::custom)
}

/// An ISO-8601 datetime or plain date, `null` or `""`.
pub fn nullable_datetime<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(s) if s.is_empty() => Ok(Some(None)),
        Some(s) => parse_datetime(&s).map(|v| Some(Some(v))).map_err(D::Error::custom),
    }
}

/// A `YYYY-MM-DD` date (a full datetime is truncated), `null` or `""`.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse_datetime(&s).map(|v| Some(v.date_naive())).map_err(D::Error::custom),
    }
}

/// The text inside a tri-state field, if one was sent.
pub fn present(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(|v| v.as_deref())
}

pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{value}' is not a valid ISO-8601 date"))
}
