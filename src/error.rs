use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Client-facing error messages, kept in one place so handlers and tests agree.
pub mod msg {
    pub const SURVEY_ID_REQUIRED: &str = "surveyId is required";
    pub const SURVEY_NOT_FOUND: &str = "Survey not found";
    pub const NOT_SURVEY_OWNER: &str = "You do not own this survey";
    pub const ALREADY_UNLOCKED: &str = "Survey responses are already unlocked";
    pub const UNLOCK_WINDOW_CLOSED: &str = "The unlock window for this survey has closed";
    pub const SURVEY_EXPIRED: &str = "This survey is no longer accepting responses";
    pub const REDIRECT_NOT_ALLOWED: &str = "Redirect URL must be on this site";
    pub const AUTH_REQUIRED: &str = "Authentication required";
    pub const NO_ANSWERS: &str = "At least one answer is required";
    pub const PROVIDER_UNAVAILABLE: &str = "Payment provider unavailable";

    pub const MISSING_SIGNATURE: &str = "Missing Stripe-Signature header";
    pub const SIGNATURE_INVALID: &str = "Webhook signature verification failed";
    pub const INVALID_PAYLOAD: &str = "Invalid webhook payload";
    pub const MISSING_METADATA: &str = "Missing survey_id in session metadata";
    pub const STORAGE_ERROR: &str = "Failed to record webhook event";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already unlocked")]
    AlreadyUnlocked,

    #[error("Unlock window closed")]
    UnlockWindowClosed,

    #[error("Survey expired")]
    SurveyExpired,

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyUnlocked => "ALREADY_UNLOCKED",
            AppError::UnlockWindowClosed => "UNLOCK_WINDOW_CLOSED",
            AppError::SurveyExpired => "SURVEY_EXPIRED",
            AppError::Provider(_) => "PROVIDER_ERROR",
            AppError::Database(_) | AppError::Pool(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::AlreadyUnlocked | AppError::UnlockWindowClosed => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SurveyExpired => StatusCode::GONE,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Pool(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match &self {
            AppError::BadRequest(msg) | AppError::Forbidden(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Unauthenticated => msg::AUTH_REQUIRED.to_string(),
            AppError::AlreadyUnlocked => msg::ALREADY_UNLOCKED.to_string(),
            AppError::UnlockWindowClosed => msg::UNLOCK_WINDOW_CLOSED.to_string(),
            AppError::SurveyExpired => msg::SURVEY_EXPIRED.to_string(),
            AppError::Provider(detail) => {
                tracing::error!("Payment provider error: {}", detail);
                msg::PROVIDER_UNAVAILABLE.to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
        };

        let body = ErrorResponse {
            error,
            code: self.code(),
        };

        (self.status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Turn a missing row into `AppError::NotFound`.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

/// Errors returned by the payment webhook endpoint.
///
/// Everything except `Storage` is terminal for the delivery; a 500 tells the
/// provider to redeliver.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("missing metadata in event {0}")]
    MissingMetadata(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl WebhookError {
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::SignatureInvalid(_) => "SIGNATURE_INVALID",
            WebhookError::InvalidPayload(_) => "INVALID_PAYLOAD",
            WebhookError::MissingMetadata(_) => "MISSING_METADATA",
            WebhookError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<rusqlite::Error> for WebhookError {
    fn from(e: rusqlite::Error) -> Self {
        WebhookError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for WebhookError {
    fn from(e: r2d2::Error) -> Self {
        WebhookError::Storage(e.to_string())
    }
}

impl From<AppError> for WebhookError {
    fn from(e: AppError) -> Self {
        WebhookError::Storage(e.to_string())
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            WebhookError::MissingSignature => (StatusCode::BAD_REQUEST, msg::MISSING_SIGNATURE),
            WebhookError::SignatureInvalid(reason) => {
                tracing::warn!("Rejected webhook delivery: {}", reason);
                (StatusCode::BAD_REQUEST, msg::SIGNATURE_INVALID)
            }
            WebhookError::InvalidPayload(reason) => {
                tracing::warn!("Unparseable webhook payload: {}", reason);
                (StatusCode::BAD_REQUEST, msg::INVALID_PAYLOAD)
            }
            WebhookError::MissingMetadata(event_id) => {
                tracing::error!(
                    "Payment event {} carries no usable survey_id; payment cannot be applied",
                    event_id
                );
                (StatusCode::BAD_REQUEST, msg::MISSING_METADATA)
            }
            WebhookError::Storage(detail) => {
                tracing::error!("Webhook storage failure, provider will redeliver: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, msg::STORAGE_ERROR)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
