use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Principal embedded in every token under the `user` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    pub email: String,
    pub user_uid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserClaim {
    pub fn new(email: impl Into<String>, user_uid: Uuid, role: Option<String>) -> Self {
        Self {
            email: email.into(),
            user_uid,
            role,
        }
    }

    /// Same principal without the role tag (refresh tokens do not carry one).
    pub fn without_role(&self) -> Self {
        Self {
            role: None,
            ..self.clone()
        }
    }
}

/// Full claim set of an issued token.
///
/// - `exp` is unix seconds
/// - `jti` is unique per issuance and only used for revocation lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user: UserClaim,
    pub exp: i64,
    pub jti: String,
    pub refresh: bool,
}

impl TokenClaims {
    pub fn kind(&self) -> TokenKind {
        if self.refresh {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn is_refresh(self) -> bool {
        matches!(self, Self::Refresh)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}
