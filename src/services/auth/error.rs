use thiserror::Error;

use crate::services::cache::CacheError;

/// Failures of the token authority.
///
/// Every token-related variant maps to its own response at the HTTP boundary.
/// `Store` and `Signing` are infrastructure failures and are reported as such,
/// never as a problem with the presented token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is malformed or its signature is invalid")]
    MalformedToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("an access token is required, got a refresh token")]
    AccessTokenRequired,

    #[error("a refresh token is required, got an access token")]
    RefreshTokenRequired,

    #[error("token has been revoked")]
    RevokedToken,

    #[error("insufficient permissions")]
    InsufficientPermission,

    #[error("invalid auth configuration: {0}")]
    Config(&'static str),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error(transparent)]
    Store(#[from] CacheError),
}

impl AuthError {
    /// Machine-readable code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "invalid_token",
            AuthError::ExpiredToken => "token_expired",
            AuthError::AccessTokenRequired => "access_token_required",
            AuthError::RefreshTokenRequired => "refresh_token_required",
            AuthError::RevokedToken => "token_revoked",
            AuthError::InsufficientPermission => "insufficient_permissions",
            AuthError::Config(_) | AuthError::Signing(_) | AuthError::Store(_) => {
                "internal_server_error"
            }
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Config(_) | AuthError::Signing(_) | AuthError::Store(_)
        )
    }
}
