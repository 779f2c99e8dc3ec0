use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Already checked in")]
    AlreadyCheckedIn,

    #[error("No active attendance record")]
    NoActiveAttendance,

    #[error("A break is already active")]
    BreakAlreadyActive,

    #[error("No active break")]
    NoActiveBreak,

    #[error("QR code is invalid or expired")]
    InvalidOrExpiredToken,

    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Vacation request has already been resolved")]
    RequestAlreadyResolved,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable kind, surfaced in the response envelope so
    /// clients can branch without parsing the human message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            AppError::NoActiveAttendance => "NO_ACTIVE_ATTENDANCE",
            AppError::BreakAlreadyActive => "BREAK_ALREADY_ACTIVE",
            AppError::NoActiveBreak => "NO_ACTIVE_BREAK",
            AppError::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            AppError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            AppError::RequestAlreadyResolved => "REQUEST_ALREADY_RESOLVED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AlreadyCheckedIn
            | AppError::NoActiveAttendance
            | AppError::BreakAlreadyActive
            | AppError::NoActiveBreak
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidOrExpiredToken => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateEmail(_) | AppError::RequestAlreadyResolved => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, self);
        } else {
            log::warn!("Request rejected with status {}: {}", status_code, self);
        }

        let response_body = ApiResponse::<()>::error_with_code(self.code(), &self.to_string());

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::Storage(error)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("Token handling failed: {}", error))
    }
}
