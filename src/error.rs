/*
 * Responsibility
 * - The app-wide AppError
 * - IntoResponse (HTTP status / JSON error body)
 * - Unified conversion of repo / cache / auth / config errors
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::repos::error::RepoError;
use crate::services::{
    auth::AuthError, cache::CacheError, password::PasswordError,
    url_token::UrlTokenError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("missing or invalid Authorization header")]
    Unauthorized,
    #[error(transparent)]
    Auth(AuthError),
    #[error("user with this email already exists")]
    UserAlreadyExists,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("conflict")]
    Conflict,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Auth(e) => match e {
                AuthError::MalformedToken
                | AuthError::ExpiredToken
                | AuthError::AccessTokenRequired
                | AuthError::RevokedToken => StatusCode::UNAUTHORIZED,
                AuthError::RefreshTokenRequired | AuthError::InsufficientPermission => {
                    StatusCode::FORBIDDEN
                }
                AuthError::Config(_) | AuthError::Signing(_) | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::UserAlreadyExists | AppError::Conflict => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { code, .. } => *code,
            AppError::Unauthorized => "not_authenticated",
            AppError::Auth(e) => e.code(),
            AppError::UserAlreadyExists => "user_exists",
            AppError::InvalidCredentials => "invalid_email_or_password",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict => "conflict",
            AppError::Internal => "internal_server_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::BadRequest { message, .. } => message.clone(),
            AppError::NotFound { resource } => format!("{resource} not found."),
            // Infrastructure details stay in the logs.
            AppError::Auth(e) if e.is_infrastructure() => "internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        if e.is_infrastructure() {
            error!(error = %e, "auth infrastructure failure");
        } else {
            warn!(code = e.code(), "auth rejected");
        }
        AppError::Auth(e)
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Conflict,
            RepoError::Db(e) => {
                error!(error = %e, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        error!(error = %e, "cache error");
        AppError::Internal
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        error!(error = %e, "password hashing failed");
        AppError::Internal
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        error!(error = %e, "configuration error");
        AppError::Internal
    }
}

impl From<UrlTokenError> for AppError {
    fn from(e: UrlTokenError) -> Self {
        match e {
            UrlTokenError::Expired => AppError::bad_request("link_expired", e.to_string()),
            UrlTokenError::Invalid | UrlTokenError::WrongPurpose => {
                AppError::bad_request("invalid_link", e.to_string())
            }
        }
    }
}
