use chrono::Utc;
use jsonwebtoken::Algorithm;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::services::auth::{
    claims::{TokenClaims, TokenKind, UserClaim},
    error::AuthError,
    jwt::JwtCodec,
    revocation::RevocationStore,
};

/// Everything the authority needs, built once from `Config`.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    // Minimum lifetime of a blocklist entry.
    pub revocation_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("revocation_ttl", &self.revocation_ttl)
            .finish_non_exhaustive()
    }
}

/// Tokens minted together at login.
#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, verifies and revokes session tokens.
///
/// Issuing and verifying are pure; only `authorize` and `revoke` reach the
/// revocation store.
#[derive(Clone)]
pub struct TokenAuthority {
    codec: JwtCodec,
    revocations: Arc<dyn RevocationStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revocation_ttl: Duration,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenAuthority")
            .field("codec", &self.codec)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("revocation_ttl", &self.revocation_ttl)
            .finish()
    }
}

impl TokenAuthority {
    pub fn new(config: &AuthConfig, revocations: Arc<dyn RevocationStore>) -> Result<Self, AuthError> {
        let codec = JwtCodec::new(config.secret.as_bytes(), config.algorithm)?;

        // A blocklist entry must outlive every token it could refer to.
        let revocation_ttl = config
            .revocation_ttl
            .max(config.access_ttl)
            .max(config.refresh_ttl);

        Ok(Self {
            codec,
            revocations,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            revocation_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn revocation_ttl(&self) -> Duration {
        self.revocation_ttl
    }

    /// Sign a new token for `user`.
    ///
    /// `ttl` overrides the default lifetime for `kind`; it is clamped to at
    /// least one second so `exp` is always in the future.
    pub fn issue(
        &self,
        user: UserClaim,
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or(match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        });
        let exp = i64::try_from(ttl.as_secs().max(1))
            .ok()
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .ok_or(AuthError::Config("token ttl out of range"))?;

        let claims = TokenClaims {
            user,
            exp,
            jti: Uuid::new_v4().to_string(),
            refresh: kind.is_refresh(),
        };

        debug!(
            user_uid = %claims.user.user_uid,
            kind = %kind,
            jti = %claims.jti,
            exp = claims.exp,
            "issuing token"
        );

        self.codec.sign(&claims)
    }

    /// Access token (with role) plus refresh token (without role) for one login.
    pub fn issue_pair(&self, user: &UserClaim) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user.clone(), TokenKind::Access, None)?,
            refresh_token: self.issue(user.without_role(), TokenKind::Refresh, None)?,
        })
    }

    /// Signature and expiry check only.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.codec.decode::<TokenClaims>(token).map_err(|e| {
            let err = AuthError::from(e);
            debug!(code = err.code(), "token verification failed");
            err
        })
    }

    /// Verify, then check the token kind, then the blocklist. In that order:
    /// a token that fails verification never reaches the store.
    pub async fn authorize(
        &self,
        token: &str,
        required: TokenKind,
    ) -> Result<TokenClaims, AuthError> {
        let claims = self.verify(token)?;

        match (required, claims.kind()) {
            (TokenKind::Access, TokenKind::Refresh) => return Err(AuthError::AccessTokenRequired),
            (TokenKind::Refresh, TokenKind::Access) => return Err(AuthError::RefreshTokenRequired),
            _ => {}
        }

        if self.revocations.is_revoked(&claims.jti).await? {
            warn!(jti = %claims.jti, user_uid = %claims.user.user_uid, "revoked token presented");
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Blocklist `jti`. Revoking an already revoked or expired id is fine.
    pub async fn revoke(&self, jti: &str) -> Result<(), AuthError> {
        self.revocations.revoke(jti, self.revocation_ttl).await?;
        debug!(jti = %jti, ttl_secs = self.revocation_ttl.as_secs(), "token revoked");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::auth::revocation::CacheRevocationStore;
    use crate::services::cache::{CacheError, MemoryCache};
    use std::{future::Future, pin::Pin};

    pub(crate) fn test_config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret-key".to_string(),
            algorithm: Algorithm::HS256,
            access_ttl: Duration::from_secs(3600),
            refresh_ttl: Duration::from_secs(2 * 24 * 3600),
            revocation_ttl: Duration::from_secs(3600),
        }
    }

    pub(crate) fn test_authority() -> TokenAuthority {
        let store = CacheRevocationStore::new(Arc::new(MemoryCache::new()));
        TokenAuthority::new(&test_config(), Arc::new(store)).unwrap()
    }

    fn user(role: Option<&str>) -> UserClaim {
        UserClaim::new("reader@bookly.dev", Uuid::new_v4(), role.map(str::to_string))
    }

    // Store that fails every call; also proves a call was (not) made.
    struct DownStore;

    impl RevocationStore for DownStore {
        fn revoke<'a>(
            &'a self,
            _jti: &'a str,
            _ttl: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + 'a>> {
            Box::pin(async { Err(CacheError::BackendConnection("down".into())) })
        }

        fn is_revoked<'a>(
            &'a self,
            _jti: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<bool, CacheError>> + Send + 'a>> {
            Box::pin(async { Err(CacheError::BackendConnection("down".into())) })
        }
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let authority = test_authority();
        let user = user(Some("user"));

        let token = authority.issue(user.clone(), TokenKind::Access, None).unwrap();
        let claims = authority.verify(&token).unwrap();

        assert_eq!(claims.user, user);
        assert!(!claims.refresh);
        assert!(claims.exp > Utc::now().timestamp());
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn jti_is_fresh_per_issue() {
        let authority = test_authority();
        let user = user(None);

        let a = authority.verify(&authority.issue(user.clone(), TokenKind::Access, None).unwrap());
        let b = authority.verify(&authority.issue(user, TokenKind::Access, None).unwrap());

        assert_ne!(a.unwrap().jti, b.unwrap().jti);
    }

    #[test]
    fn default_ttl_depends_on_kind() {
        let authority = test_authority();
        let now = Utc::now().timestamp();

        let access = authority
            .verify(&authority.issue(user(None), TokenKind::Access, None).unwrap())
            .unwrap();
        let refresh = authority
            .verify(&authority.issue(user(None), TokenKind::Refresh, None).unwrap())
            .unwrap();

        assert!((access.exp - now - 3600).abs() <= 2);
        assert!((refresh.exp - now - 2 * 24 * 3600).abs() <= 2);
        assert!(refresh.refresh);
    }

    #[test]
    fn pair_has_distinct_jtis_and_role_only_on_access() {
        let authority = test_authority();
        let pair = authority.issue_pair(&user(Some("admin"))).unwrap();

        let access = authority.verify(&pair.access_token).unwrap();
        let refresh = authority.verify(&pair.refresh_token).unwrap();

        assert_ne!(access.jti, refresh.jti);
        assert_eq!(access.user.role.as_deref(), Some("admin"));
        assert_eq!(refresh.user.role, None);
        assert!(!access.refresh);
        assert!(refresh.refresh);
    }

    #[test]
    fn tampered_signature_is_malformed() {
        let authority = test_authority();
        let token = authority.issue(user(None), TokenKind::Access, None).unwrap();

        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = sig.chars().collect();
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{head}.{}", sig.into_iter().collect::<String>());

        assert!(matches!(
            authority.verify(&tampered),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let authority = test_authority();
        assert!(matches!(
            authority.verify("definitely.not.a-token"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_expired_not_malformed() {
        let authority = test_authority();
        let token = authority
            .issue(user(None), TokenKind::Access, Some(Duration::from_secs(1)))
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(matches!(
            authority.verify(&token),
            Err(AuthError::ExpiredToken)
        ));
        assert!(matches!(
            authority.authorize(&token, TokenKind::Access).await,
            Err(AuthError::ExpiredToken)
        ));
    }

    #[tokio::test]
    async fn kinds_are_not_interchangeable() {
        let authority = test_authority();
        let pair = authority.issue_pair(&user(Some("user"))).unwrap();

        assert!(matches!(
            authority.authorize(&pair.refresh_token, TokenKind::Access).await,
            Err(AuthError::AccessTokenRequired)
        ));
        assert!(matches!(
            authority.authorize(&pair.access_token, TokenKind::Refresh).await,
            Err(AuthError::RefreshTokenRequired)
        ));
        assert!(authority.authorize(&pair.access_token, TokenKind::Access).await.is_ok());
        assert!(authority.authorize(&pair.refresh_token, TokenKind::Refresh).await.is_ok());
    }

    #[tokio::test]
    async fn revoking_access_leaves_refresh_usable() {
        let authority = test_authority();
        let pair = authority.issue_pair(&user(Some("user"))).unwrap();
        let access = authority.verify(&pair.access_token).unwrap();

        authority.revoke(&access.jti).await.unwrap();

        assert!(matches!(
            authority.authorize(&pair.access_token, TokenKind::Access).await,
            Err(AuthError::RevokedToken)
        ));
        let refresh = authority
            .authorize(&pair.refresh_token, TokenKind::Refresh)
            .await
            .unwrap();
        assert_ne!(refresh.jti, access.jti);
    }

    #[tokio::test]
    async fn revoke_twice_is_same_as_once() {
        let authority = test_authority();
        let token = authority.issue(user(None), TokenKind::Access, None).unwrap();
        let jti = authority.verify(&token).unwrap().jti;

        authority.revoke(&jti).await.unwrap();
        authority.revoke(&jti).await.unwrap();
        // Unknown ids are fine too.
        authority.revoke("never-issued").await.unwrap();

        assert!(matches!(
            authority.authorize(&token, TokenKind::Access).await,
            Err(AuthError::RevokedToken)
        ));
    }

    #[tokio::test]
    async fn malformed_token_never_reaches_the_store() {
        let authority = TokenAuthority::new(&test_config(), Arc::new(DownStore)).unwrap();

        // With a dead store, reaching it would surface as Store(_).
        assert!(matches!(
            authority.authorize("garbage", TokenKind::Access).await,
            Err(AuthError::MalformedToken)
        ));

        let refresh = authority.issue(user(None), TokenKind::Refresh, None).unwrap();
        assert!(matches!(
            authority.authorize(&refresh, TokenKind::Access).await,
            Err(AuthError::AccessTokenRequired)
        ));
    }

    #[tokio::test]
    async fn store_failure_is_infrastructure() {
        let authority = TokenAuthority::new(&test_config(), Arc::new(DownStore)).unwrap();
        let token = authority.issue(user(None), TokenKind::Access, None).unwrap();

        let err = authority.authorize(&token, TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
        assert!(err.is_infrastructure());

        let err = authority.revoke("x").await.unwrap_err();
        assert!(err.is_infrastructure());
    }

    #[test]
    fn sub_second_ttl_still_gives_a_future_exp() {
        let authority = test_authority();
        let before = Utc::now().timestamp();

        for ttl in [Duration::ZERO, Duration::from_millis(500)] {
            let claims = authority
                .verify(&authority.issue(user(None), TokenKind::Access, Some(ttl)).unwrap())
                .unwrap();
            assert!(claims.exp >= before + 1);
        }
    }

    #[test]
    fn oversized_ttl_is_a_config_error() {
        let authority = test_authority();

        for ttl in [Duration::from_secs(i64::MAX as u64), Duration::MAX] {
            assert!(matches!(
                authority.issue(user(None), TokenKind::Access, Some(ttl)),
                Err(AuthError::Config(_))
            ));
        }
    }

    #[tokio::test]
    async fn oversized_revocation_window_fails_without_panicking() {
        let config = AuthConfig {
            refresh_ttl: Duration::from_secs(u64::MAX / 2),
            ..test_config()
        };
        let store = CacheRevocationStore::new(Arc::new(MemoryCache::new()));
        let authority = TokenAuthority::new(&config, Arc::new(store)).unwrap();

        let err = authority.revoke("x").await.unwrap_err();
        assert!(err.is_infrastructure());
        assert!(matches!(
            authority.issue(user(None), TokenKind::Refresh, None),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn revocation_window_covers_longest_token() {
        let authority = test_authority();
        assert_eq!(authority.revocation_ttl(), authority.refresh_ttl());
    }
}
