/*
 * Responsibility
 * - reviews CRUD (reviews belong to a book; CASCADE on book delete)
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub uid: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub user_uid: Option<Uuid>,
    pub book_uid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn list_for_book(pool: &PgPool, book_uid: Uuid) -> RepoResult<Vec<ReviewRow>> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT uid, rating, review_text, user_uid, book_uid, created_at, updated_at
        FROM reviews
        WHERE book_uid = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(book_uid)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get(pool: &PgPool, uid: Uuid) -> RepoResult<Option<ReviewRow>> {
    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT uid, rating, review_text, user_uid, book_uid, created_at, updated_at
        FROM reviews
        WHERE uid = $1
        "#,
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn create(
    pool: &PgPool,
    book_uid: Uuid,
    user_uid: Uuid,
    rating: i32,
    review_text: &str,
) -> RepoResult<ReviewRow> {
    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        INSERT INTO reviews (rating, review_text, user_uid, book_uid)
        VALUES ($1, $2, $3, $4)
        RETURNING uid, rating, review_text, user_uid, book_uid, created_at, updated_at
        "#,
    )
    .bind(rating)
    .bind(review_text)
    .bind(user_uid)
    .bind(book_uid)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn delete(pool: &PgPool, uid: Uuid) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM reviews
        WHERE uid = $1
        "#,
    )
    .bind(uid)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
