//! Password hashing (Argon2 PHC strings via `password-auth`).
//!
//! Hashing is deliberately slow, so both calls run on the blocking pool.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub async fn hash_password(plain: String) -> Result<String, PasswordError> {
    let hash = tokio::task::spawn_blocking(move || password_auth::generate_hash(plain)).await?;
    Ok(hash)
}

/// `Ok(false)` for a wrong password or an unparsable stored hash.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, PasswordError> {
    let ok = tokio::task::spawn_blocking(move || {
        password_auth::verify_password(plain, &hash).is_ok()
    })
    .await?;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_only_the_same_password() {
        let hash = hash_password("s3cret!".to_string()).await.unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(verify_password("s3cret!".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_does_not_verify() {
        assert!(!verify_password("pw".into(), "not-a-phc-string".into()).await.unwrap());
    }
}
