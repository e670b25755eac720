//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic conversion into the JSON error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::types::Envelope;

/// Application error types.
///
/// Every variant maps to a stable numeric `error_code` that clients match on.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Failed(String),

    // Authentication & Authorization
    #[error("{0}")]
    AuthFailed(String),

    #[error("Invalid token, please sign in again")]
    InvalidToken,

    #[error("Token expired, please sign in again")]
    ExpiredToken,

    #[error("{0}")]
    Forbidden(String),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    // Validation
    #[error("{0}")]
    Parameters(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> u32 {
        match self {
            AppError::Failed(_) => 9999,
            AppError::AuthFailed(_) => 10000,
            AppError::NotFound(_) => 10020,
            AppError::Parameters(_) => 10030,
            AppError::InvalidToken => 10040,
            AppError::ExpiredToken => 10050,
            AppError::Forbidden(_) => 10070,
            AppError::Database(_) | AppError::Internal(_) => 999,
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Failed(_) | AppError::Parameters(_) => StatusCode::BAD_REQUEST,
            AppError::AuthFailed(_) | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ExpiredToken => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Report a unique index violation as Forbidden with `msg`.
    ///
    /// Covers writes racing a uniqueness check done just before them.
    /// Every other error is returned unchanged.
    pub fn on_unique_violation(self, msg: &str) -> Self {
        match self {
            AppError::Database(err) => {
                let sql_err = err.sql_err();
                unique_violation_or(sql_err, err, msg)
            }
            other => other,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Unknown server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Unknown server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

fn unique_violation_or(sql_err: Option<SqlErr>, err: DbErr, msg: &str) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!("Unique index violation: {}", detail);
            AppError::forbidden(msg)
        }
        _ => AppError::Database(err),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        Envelope::new(self.code(), self.user_message()).into_response_with(status)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AppError::ExpiredToken,
            _ => {
                tracing::debug!("Rejected token: {:?}", err);
                AppError::InvalidToken
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(msg))
    }
}

/// Convenience constructors
impl AppError {
    pub fn failed(msg: impl Into<String>) -> Self {
        AppError::Failed(msg.into())
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        AppError::AuthFailed(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn parameters(msg: impl Into<String>) -> Self {
        AppError::Parameters(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
