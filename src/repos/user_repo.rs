/*
 * Responsibility
 * - SQLx operations on the users table (the user directory)
 * - Takes &PgPool, returns RepoError so handlers can map it
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub uid: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_verified: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

const USER_COLUMNS: &str = r#"
    uid, username, email, first_name, last_name, role,
    is_verified, password_hash, created_at, updated_at
"#;

pub async fn find_by_email(db: &PgPool, email: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, uid: Uuid) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE uid = $1"
    ))
    .bind(uid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Insert a new (unverified, role `user`) account.
///
/// A duplicate email surfaces as `RepoError::Conflict`.
pub async fn create(db: &PgPool, new_user: NewUser<'_>) -> RepoResult<UserRow> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.first_name)
    .bind(new_user.last_name)
    .bind(new_user.password_hash)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn mark_verified(db: &PgPool, uid: Uuid) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET is_verified = TRUE, updated_at = now()
        WHERE uid = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(uid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn set_password_hash(
    db: &PgPool,
    uid: Uuid,
    password_hash: &str,
) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET password_hash = $2, updated_at = now()
        WHERE uid = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(uid)
    .bind(password_hash)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
