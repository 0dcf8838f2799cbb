use serde::Serialize;
use thiserror::Error;

/// Status reported to callers when the remote error carries no HTTP status,
/// e.g. a dispatch or timeout failure before any response arrived.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

pub const RESOURCE_NOT_FOUND_CODE: &str = "ResourceNotFoundException";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    NotFound,
    Throttled,
    Validation,
    AccessDenied,
    Service,
    Transport,
}

impl RemoteErrorKind {
    /// Derives the kind from the service error code, falling back to the HTTP
    /// status when the code is unknown. No status at all means the request
    /// never got a response.
    pub fn classify(code: Option<&str>, status_code: Option<u16>) -> Self {
        match code {
            Some(RESOURCE_NOT_FOUND_CODE) => return Self::NotFound,
            Some("ThrottlingException" | "TooManyRequestsException" | "LimitExceededException") => {
                return Self::Throttled;
            }
            Some(
                "InvalidParameterException"
                | "InvalidRequestException"
                | "ValidationException"
                | "DuplicateResourceException"
                | "ResourceConflictException"
                | "ResourceInUseException",
            ) => return Self::Validation,
            Some("AccessDeniedException") => return Self::AccessDenied,
            _ => {}
        }

        match status_code {
            None => Self::Transport,
            Some(404) => Self::NotFound,
            Some(429) => Self::Throttled,
            Some(401 | 403) => Self::AccessDenied,
            Some(400..=499) => Self::Validation,
            Some(_) => Self::Service,
        }
    }
}

/// A failed call against the Connect control plane.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub status_code: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(
        kind: RemoteErrorKind,
        status_code: Option<u16>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status_code,
            code,
            message: message.into(),
        }
    }

    pub fn from_parts(
        code: Option<&str>,
        status_code: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            RemoteErrorKind::classify(code, status_code),
            status_code,
            code.map(str::to_string),
            message,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            RemoteErrorKind::NotFound,
            Some(404),
            Some(RESOURCE_NOT_FOUND_CODE.to_string()),
            message,
        )
    }

    pub fn with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::from_parts(None, Some(status_code), message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Transport, None, None, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    /// The status a gateway response should carry for this error.
    pub fn http_status(&self) -> u16 {
        self.status_code.unwrap_or(DEFAULT_ERROR_STATUS)
    }
}
