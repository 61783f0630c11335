/*
 * Responsibility
 * - Users/auth request and response DTOs
 * - validate() for shape checks (length, presence); DB checks live in handlers
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::v1::dto::books::BookResponse;
use crate::repos::user_repo::UserRow;

pub const USERNAME_MAX_LEN: usize = 8;
pub const PASSWORD_MIN_LEN: usize = 6;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err("username is required");
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err("username must be <= 8 chars");
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("first_name and last_name are required");
        }
        if !looks_like_email(self.email.trim()) {
            return Err("email is invalid");
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err("password must be >= 6 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub new_password: String,
    pub confirm_new_password: String,
}

impl PasswordResetConfirmRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.new_password != self.confirm_new_password {
            return Err("passwords do not match");
        }
        if self.new_password.chars().count() < PASSWORD_MIN_LEN {
            return Err("password must be >= 6 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub uid: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Never exposes password_hash.
impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserWithBooksResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub books: Vec<BookResponse>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub email: String,
    pub uid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            username: "reader".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@bookly.dev".into(),
            password: "secret1".into(),
        }
    }

    #[test]
    fn signup_validation() {
        assert!(signup().validate().is_ok());

        let mut req = signup();
        req.username = "toolongname".into();
        assert_eq!(req.validate(), Err("username must be <= 8 chars"));

        let mut req = signup();
        req.password = "12345".into();
        assert_eq!(req.validate(), Err("password must be >= 6 chars"));

        let mut req = signup();
        req.email = "not-an-email".into();
        assert_eq!(req.validate(), Err("email is invalid"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Bookly.DEV "), "ada@bookly.dev");
    }

    #[test]
    fn reset_confirm_requires_matching_passwords() {
        let req = PasswordResetConfirmRequest {
            new_password: "abcdef".into(),
            confirm_new_password: "abcdeg".into(),
        };
        assert_eq!(req.validate(), Err("passwords do not match"));
    }
}
