use connect_dashboard_core::batch::BatchError;
use connect_dashboard_core::contract::ValidationError;
use connect_dashboard_core::error::RemoteError;
use thiserror::Error;

use crate::adapters::identity::IdentityError;

/// Every way a routed request can fail before a response is produced.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("{0}")]
    Misconfiguration(String),
    #[error("Route not found: {0}")]
    RouteNotFound(String),
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Batch(_) | Self::Misconfiguration(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Remote(error) => error.http_status(),
            Self::RouteNotFound(_) => 404,
            Self::Serialization(_) => 500,
        }
    }
}

impl From<ValidationError> for HandlerError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.message().to_string())
    }
}

impl From<IdentityError> for HandlerError {
    fn from(error: IdentityError) -> Self {
        Self::Unauthorized(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_source() {
        assert_eq!(HandlerError::validation("bad").status_code(), 400);
        assert_eq!(
            HandlerError::from(IdentityError::MissingToken).status_code(),
            401
        );
        assert_eq!(
            HandlerError::from(RemoteError::with_status(429, "slow down")).status_code(),
            429
        );
        assert_eq!(
            HandlerError::from(RemoteError::transport("timed out")).status_code(),
            500
        );
        assert_eq!(
            HandlerError::from(BatchError::BatchTooLarge { count: 26, max: 25 }).status_code(),
            400
        );
        assert_eq!(
            HandlerError::RouteNotFound("GET /nowhere".to_string()).status_code(),
            404
        );
    }

    #[test]
    fn validation_error_keeps_message() {
        let error = HandlerError::from(ValidationError::new("instanceId is required"));
        assert_eq!(error.to_string(), "instanceId is required");
    }
}
