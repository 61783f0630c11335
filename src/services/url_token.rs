/*
 * Responsibility
 * - Short signed tokens embedded in emailed links (verify email, reset password)
 * - Signed with a key derived from the JWT secret, so a link token can never
 *   pass as a session token (and vice versa: the claim shapes differ too)
 */
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::services::auth::{
    AuthConfig, AuthError,
    jwt::{DecodeError, JwtCodec},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlTokenPurpose {
    VerifyEmail,
    PasswordReset,
}

#[derive(Debug, Serialize, Deserialize)]
struct UrlTokenClaims {
    email: String,
    purpose: UrlTokenPurpose,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum UrlTokenError {
    #[error("link is invalid")]
    Invalid,
    #[error("link has expired")]
    Expired,
    #[error("link was issued for another purpose")]
    WrongPurpose,
}

#[derive(Clone, Debug)]
pub struct UrlTokenSigner {
    codec: JwtCodec,
    ttl: Duration,
}

impl UrlTokenSigner {
    pub fn new(auth: &AuthConfig, ttl: Duration) -> Result<Self, AuthError> {
        let key = format!("{}:url-token", auth.secret);
        Ok(Self {
            codec: JwtCodec::new(key.as_bytes(), auth.algorithm)?,
            ttl,
        })
    }

    pub fn create(&self, email: &str, purpose: UrlTokenPurpose) -> Result<String, AuthError> {
        let exp = i64::try_from(self.ttl.as_secs().max(1))
            .ok()
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .ok_or(AuthError::Config("url token ttl out of range"))?;
        self.codec.sign(&UrlTokenClaims {
            email: email.to_string(),
            purpose,
            exp,
        })
    }

    /// Returns the email the link was issued for.
    pub fn decode(&self, token: &str, purpose: UrlTokenPurpose) -> Result<String, UrlTokenError> {
        let claims = self
            .codec
            .decode::<UrlTokenClaims>(token)
            .map_err(|e| match e {
                DecodeError::Expired => UrlTokenError::Expired,
                DecodeError::Malformed(_) => UrlTokenError::Invalid,
            })?;

        if claims.purpose != purpose {
            return Err(UrlTokenError::WrongPurpose);
        }
        Ok(claims.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::authority::tests::{test_authority, test_config};
    use crate::services::auth::{TokenKind, UserClaim};
    use uuid::Uuid;

    fn signer() -> UrlTokenSigner {
        UrlTokenSigner::new(&test_config(), Duration::from_secs(600)).unwrap()
    }

    #[test]
    fn decodes_email_for_matching_purpose() {
        let signer = signer();
        let token = signer.create("a@b.c", UrlTokenPurpose::VerifyEmail).unwrap();
        assert_eq!(
            signer.decode(&token, UrlTokenPurpose::VerifyEmail).unwrap(),
            "a@b.c"
        );
    }

    #[test]
    fn purpose_mismatch_is_rejected() {
        let signer = signer();
        let token = signer.create("a@b.c", UrlTokenPurpose::VerifyEmail).unwrap();
        assert!(matches!(
            signer.decode(&token, UrlTokenPurpose::PasswordReset),
            Err(UrlTokenError::WrongPurpose)
        ));
    }

    #[test]
    fn session_tokens_are_not_links_and_links_are_not_sessions() {
        let signer = signer();
        let authority = test_authority();

        let session = authority
            .issue(
                UserClaim::new("a@b.c", Uuid::new_v4(), None),
                TokenKind::Access,
                None,
            )
            .unwrap();
        assert!(matches!(
            signer.decode(&session, UrlTokenPurpose::VerifyEmail),
            Err(UrlTokenError::Invalid)
        ));

        let link = signer.create("a@b.c", UrlTokenPurpose::PasswordReset).unwrap();
        assert!(matches!(
            authority.verify(&link),
            Err(AuthError::MalformedToken)
        ));
    }
}
