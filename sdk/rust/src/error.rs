//! Error types for the survey unlock SDK

use thiserror::Error;

/// Machine-readable error codes. Server codes map one-to-one; `Network` and
/// `Validation` originate in the SDK itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockErrorCode {
    InvalidRequest,
    Unauthenticated,
    Forbidden,
    NotFound,
    AlreadyUnlocked,
    UnlockWindowClosed,
    SurveyExpired,
    ProviderError,
    Internal,
    Network,
    Validation,
}

impl UnlockErrorCode {
    /// Parse the `code` field of a server error body.
    pub fn from_server_code(code: &str) -> Option<Self> {
        match code {
            "INVALID_REQUEST" => Some(Self::InvalidRequest),
            "UNAUTHENTICATED" => Some(Self::Unauthenticated),
            "FORBIDDEN" => Some(Self::Forbidden),
            "NOT_FOUND" => Some(Self::NotFound),
            "ALREADY_UNLOCKED" => Some(Self::AlreadyUnlocked),
            "UNLOCK_WINDOW_CLOSED" => Some(Self::UnlockWindowClosed),
            "SURVEY_EXPIRED" => Some(Self::SurveyExpired),
            "PROVIDER_ERROR" => Some(Self::ProviderError),
            "INTERNAL" => Some(Self::Internal),
            _ => None,
        }
    }

    /// Fallback when the body carried no recognizable code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Unauthenticated,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            410 => Self::SurveyExpired,
            502 => Self::ProviderError,
            _ => Self::Internal,
        }
    }
}

/// SDK error with a code, a human-readable message and the HTTP status when
/// one was received.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UnlockError {
    pub code: UnlockErrorCode,
    pub message: String,
    pub status: Option<u16>,
}

impl UnlockError {
    pub fn new(code: UnlockErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(code: UnlockErrorCode, message: impl Into<String>, status: u16) -> Self {
        Self {
            code,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(UnlockErrorCode::Network, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(UnlockErrorCode::Validation, message)
    }
}

pub type Result<T> = std::result::Result<T, UnlockError>;
