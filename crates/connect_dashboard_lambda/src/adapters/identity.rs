//! Caller identity taken from the Cognito ID token forwarded by the gateway.
//!
//! The gateway authorizer has already verified the token signature, so only
//! the payload section is decoded here.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Authorization token is required")]
    MissingToken,
    #[error("Requested token is invalid")]
    Malformed,
    #[error("Requested token payload is invalid: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub username: Option<String>,
    pub groups: Vec<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    #[serde(rename = "cognito:username")]
    username: Option<String>,
    #[serde(rename = "cognito:groups", default)]
    groups: Vec<String>,
    email: Option<String>,
}

pub fn decode_identity_token(token: &str) -> Result<CallerIdentity, IdentityError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
        return Err(IdentityError::MissingToken);
    }

    let mut sections = token.split('.');
    let payload = match (sections.next(), sections.next()) {
        (Some(_header), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(IdentityError::Malformed),
    };

    // Tolerate padded and standard-alphabet encodings.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|character| match character {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|error| IdentityError::InvalidPayload(error.to_string()))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)
        .map_err(|error| IdentityError::InvalidPayload(error.to_string()))?;

    Ok(CallerIdentity {
        username: claims.username,
        groups: claims.groups,
        email: claims.email,
    })
}
