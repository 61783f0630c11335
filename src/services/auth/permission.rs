//! Declarative role requirements attached to protected routes.
use crate::services::auth::{claims::TokenClaims, error::AuthError};

pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// Roles allowed to call an operation. Checked after the token is authorized.
///
/// An empty set admits any authenticated principal, with or without a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet {
    roles: &'static [&'static str],
}

impl PermissionSet {
    pub const ANY: Self = Self { roles: &[] };
    pub const MEMBERS: Self = Self::any_of(&[roles::ADMIN, roles::USER]);
    pub const ADMINS: Self = Self::any_of(&[roles::ADMIN]);

    pub const fn any_of(roles: &'static [&'static str]) -> Self {
        Self { roles }
    }

    pub fn allows(&self, role: Option<&str>) -> bool {
        if self.roles.is_empty() {
            return true;
        }
        role.is_some_and(|r| self.roles.contains(&r))
    }

    pub fn check(&self, claims: &TokenClaims) -> Result<(), AuthError> {
        if self.allows(claims.user.role.as_deref()) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermission)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::claims::UserClaim;
    use uuid::Uuid;

    fn claims(role: Option<&str>) -> TokenClaims {
        TokenClaims {
            user: UserClaim::new("a@b.c", Uuid::new_v4(), role.map(str::to_string)),
            exp: 0,
            jti: "j".into(),
            refresh: false,
        }
    }

    #[test]
    fn any_admits_everyone() {
        assert!(PermissionSet::ANY.check(&claims(None)).is_ok());
        assert!(PermissionSet::ANY.check(&claims(Some("guest"))).is_ok());
    }

    #[test]
    fn members_require_a_listed_role() {
        assert!(PermissionSet::MEMBERS.check(&claims(Some("user"))).is_ok());
        assert!(PermissionSet::MEMBERS.check(&claims(Some("admin"))).is_ok());
        assert!(matches!(
            PermissionSet::MEMBERS.check(&claims(Some("guest"))),
            Err(AuthError::InsufficientPermission)
        ));
        assert!(matches!(
            PermissionSet::MEMBERS.check(&claims(None)),
            Err(AuthError::InsufficientPermission)
        ));
    }

    #[test]
    fn admins_only() {
        assert!(PermissionSet::ADMINS.allows(Some("admin")));
        assert!(!PermissionSet::ADMINS.allows(Some("user")));
    }
}
