//! Application error taxonomy.
//!
//! Domain failures are tagged variants carrying a human message, a
//! machine-readable code and a status classification. The boundary layer
//! pattern-matches on the variant (or calls [`AppError::status_code`]) to
//! pick a response status; rendering is its concern, not ours. Storage
//! errors pass through [`AppError::Repository`] untranslated.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// Machine-readable error codes for the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmailAlreadyExists,
    PhoneAlreadyExists,
    ZipCodeAlreadyExists,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl ErrorCode {
    /// The wire form of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::PhoneAlreadyExists => "PHONE_ALREADY_EXISTS",
            Self::ZipCodeAlreadyExists => "ZIP_CODE_ALREADY_EXISTS",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level error type for the use-case layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// A pre-condition failed (duplicate email/phone/zip code).
    #[error("{message}")]
    BadRequest { message: String, code: ErrorCode },

    /// The addressed entity does not exist.
    #[error("{message}")]
    NotFound { message: String },

    /// Storage failure, propagated unmodified.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AppError {
    /// A 400 with a specific machine code.
    pub fn bad_request(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::BadRequest {
            message: message.into(),
            code,
        }
    }

    /// A 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Status classification for the boundary layer.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Repository(_) => 500,
        }
    }

    /// Machine-readable code for the boundary layer.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::BadRequest { code, .. } => *code,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Repository(_) => ErrorCode::InternalServerError,
        }
    }

    /// The serializable wire shape for this error, stamped with the
    /// current time in epoch milliseconds.
    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            message: self.to_string(),
            http_status: self.status_code(),
            error_code: self.error_code(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// JSON error shape rendered by the boundary layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub message: String,
    pub http_status: u16,
    pub error_code: ErrorCode,
    pub timestamp: i64,
}

/// Result type alias for use-case operations.
pub type AppResult<T> = Result<T, AppError>;
