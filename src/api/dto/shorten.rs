//! DTOs for the encode and decode endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Request to shorten an origin URL.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EncodeRequest {
    /// The URL to shorten. Surrounding whitespace is dropped; a missing or
    /// `null` field reads as blank.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "crate::utils::url_validator::validate_origin_url"))]
    pub url: String,
}

/// Request to resolve a short URL.
#[derive(Debug, Default, Deserialize)]
pub struct DecodeRequest {
    /// Full short URL, e.g. `http://localhost/86Rf07`.
    #[serde(default, deserialize_with = "trimmed")]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub short_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub origin_url: String,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).unwrap_or_default())
}
