/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The guard middleware authorizes the token and stores this in request
 *   extensions; handlers only ever receive this type
 */
use uuid::Uuid;

use crate::services::auth::{TokenClaims, permission::roles};

/// Context attached to an authorized request.
///
/// - `jti` is what logout revokes
/// - `role` is absent on refresh tokens
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_uid: Uuid,
    pub role: Option<String>,
    pub jti: String,
}

impl AuthCtx {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_uid: claims.user.user_uid,
            role: claims.user.role,
            jti: claims.jti,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(roles::ADMIN)
    }

    /// Owner of a resource, or an admin.
    pub fn can_modify(&self, owner: Option<Uuid>) -> bool {
        self.is_admin() || owner == Some(self.user_uid)
    }
}
