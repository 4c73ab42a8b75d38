//! Advisory bearer-token inspection.
//!
//! Nothing here verifies a signature. The decoded payload only feeds expiry
//! hints for the operator; the backend remains the authority on every request.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config;

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Payload of a JWT-shaped token, or `None` for opaque or malformed tokens
pub fn decode_payload(token: &str) -> Option<Value> {
    if token.is_empty() || !token.contains('.') {
        return None;
    }
    let payload = token.split('.').nth(1)?;
    let normalized: String = payload
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = match LENIENT_URL_SAFE.decode(normalized.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("token payload is not base64: {}", e);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("token payload is not JSON: {}", e);
            None
        }
    }
}

/// `exp` claim in seconds, when present and numeric
pub fn expiry_seconds(token: &str) -> Option<f64> {
    decode_payload(token)?.get("exp")?.as_f64()
}

pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let exp = expiry_seconds(token)?;
    DateTime::from_timestamp(exp as i64, 0)
}

pub fn is_valid_token(token: &str) -> bool {
    is_valid_token_at(token, Utc::now())
}

/// JWTs with `exp` are valid until then; anything else (opaque tokens from
/// the legacy backend) is accepted when long enough.
pub fn is_valid_token_at(token: &str, now: DateTime<Utc>) -> bool {
    if token.is_empty() {
        return false;
    }
    match expiry_seconds(token) {
        Some(exp) => exp > now.timestamp_millis() as f64 / 1000.0,
        None => token.chars().count() >= config::config().session.min_opaque_token_len,
    }
}
