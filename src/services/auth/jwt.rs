use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Serialize, de::DeserializeOwned};
use std::str::FromStr;
use tracing::{debug, error};

use crate::services::auth::error::AuthError;

/// Why a presented token could not be decoded.
#[derive(Debug)]
pub enum DecodeError {
    // Bad signature, wrong algorithm, bad base64/JSON, missing claims...
    Malformed(jsonwebtoken::errors::Error),
    // Signature is valid but `exp` is in the past.
    Expired,
}

impl From<DecodeError> for AuthError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Malformed(e) => {
                debug!(reason = ?e.kind(), "malformed token");
                AuthError::MalformedToken
            }
            DecodeError::Expired => AuthError::ExpiredToken,
        }
    }
}

/// Parse a `JWT_ALGORITHM` value. Only HMAC algorithms are accepted: the
/// signing key is a shared secret.
pub fn parse_hmac_algorithm(value: &str) -> Option<Algorithm> {
    match Algorithm::from_str(value.trim()).ok()? {
        alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) => Some(alg),
        _ => None,
    }
}

/// HMAC JWT signer/verifier around one process-wide secret.
///
/// - Key material is intentionally not printable via Debug.
/// - Signature is checked before any claim, so an expired token with a bad
///   signature is reported as malformed.
#[derive(Clone)]
pub struct JwtCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl JwtCodec {
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Config("JWT secret must not be empty"));
        }
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Config("JWT algorithm must be HS256, HS384 or HS512"));
        }

        let mut validation = Validation::new(algorithm);
        // Expiry is exact: a token is dead the second after `exp`.
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AuthError::Signing(e.to_string())
        })
    }

    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, DecodeError> {
        match jsonwebtoken::decode::<T>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(DecodeError::Expired),
                _ => Err(DecodeError::Malformed(e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        name: String,
        exp: i64,
    }

    fn in_future(seconds: i64) -> i64 {
        chrono::Utc::now().timestamp() + seconds
    }

    #[test]
    fn parses_only_hmac_algorithms() {
        assert_eq!(parse_hmac_algorithm("HS256"), Some(Algorithm::HS256));
        assert_eq!(parse_hmac_algorithm(" HS512 "), Some(Algorithm::HS512));
        assert_eq!(parse_hmac_algorithm("RS256"), None);
        assert_eq!(parse_hmac_algorithm("EdDSA"), None);
        assert_eq!(parse_hmac_algorithm("nope"), None);
    }

    #[test]
    fn rejects_empty_secret_and_asymmetric_algorithm() {
        assert!(matches!(
            JwtCodec::new(b"", Algorithm::HS256),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            JwtCodec::new(b"secret", Algorithm::RS256),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn sign_then_decode() {
        let codec = JwtCodec::new(b"test-secret", Algorithm::HS384).unwrap();
        let probe = Probe {
            name: "bookly".into(),
            exp: in_future(60),
        };
        let token = codec.sign(&probe).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.decode::<Probe>(&token).unwrap(), probe);
    }

    #[test]
    fn other_secret_is_malformed() {
        let a = JwtCodec::new(b"secret-a", Algorithm::HS256).unwrap();
        let b = JwtCodec::new(b"secret-b", Algorithm::HS256).unwrap();
        let token = a
            .sign(&Probe {
                name: "x".into(),
                exp: in_future(60),
            })
            .unwrap();
        assert!(matches!(
            b.decode::<Probe>(&token),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn other_algorithm_is_malformed() {
        let a = JwtCodec::new(b"same", Algorithm::HS512).unwrap();
        let b = JwtCodec::new(b"same", Algorithm::HS256).unwrap();
        let token = a
            .sign(&Probe {
                name: "x".into(),
                exp: in_future(60),
            })
            .unwrap();
        assert!(matches!(
            b.decode::<Probe>(&token),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn past_exp_is_expired() {
        let codec = JwtCodec::new(b"test-secret", Algorithm::HS256).unwrap();
        let token = codec
            .sign(&Probe {
                name: "old".into(),
                exp: in_future(-30),
            })
            .unwrap();
        assert!(matches!(
            codec.decode::<Probe>(&token),
            Err(DecodeError::Expired)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = JwtCodec::new(b"test-secret", Algorithm::HS256).unwrap();
        for input in ["", "not-a-jwt", "a.b.c", "....."] {
            assert!(matches!(
                codec.decode::<Probe>(input),
                Err(DecodeError::Malformed(_))
            ));
        }
    }
}
