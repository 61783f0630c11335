/*
 * Responsibility
 * - books CRUD
 * - user_uid is the submitting user (FK, SET NULL on user delete)
 */
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRow {
    pub uid: Uuid,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
    pub user_uid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBook<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub publisher: &'a str,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: &'a str,
}

// None fields are left untouched.
#[derive(Default)]
pub struct BookChanges<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub publisher: Option<&'a str>,
    pub published_date: Option<NaiveDate>,
    pub page_count: Option<i32>,
    pub language: Option<&'a str>,
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> RepoResult<Vec<BookRow>> {
    let rows = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT
            uid, title, author, publisher, published_date, page_count, language,
            user_uid, created_at, updated_at
        FROM books
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_by_user(pool: &PgPool, user_uid: Uuid) -> RepoResult<Vec<BookRow>> {
    let rows = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT
            uid, title, author, publisher, published_date, page_count, language,
            user_uid, created_at, updated_at
        FROM books
        WHERE user_uid = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_uid)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get(pool: &PgPool, uid: Uuid) -> RepoResult<Option<BookRow>> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT
            uid, title, author, publisher, published_date, page_count, language,
            user_uid, created_at, updated_at
        FROM books
        WHERE uid = $1
        "#,
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn create(pool: &PgPool, book: NewBook<'_>, user_uid: Uuid) -> RepoResult<BookRow> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        INSERT INTO books
            (title, author, publisher, published_date, page_count, language, user_uid)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING
            uid, title, author, publisher, published_date, page_count, language,
            user_uid, created_at, updated_at
        "#,
    )
    .bind(book.title)
    .bind(book.author)
    .bind(book.publisher)
    .bind(book.published_date)
    .bind(book.page_count)
    .bind(book.language)
    .bind(user_uid)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    uid: Uuid,
    changes: BookChanges<'_>,
) -> RepoResult<Option<BookRow>> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        UPDATE books
        SET
            title = COALESCE($2, title),
            author = COALESCE($3, author),
            publisher = COALESCE($4, publisher),
            published_date = COALESCE($5, published_date),
            page_count = COALESCE($6, page_count),
            language = COALESCE($7, language),
            updated_at = now()
        WHERE uid = $1
        RETURNING
            uid, title, author, publisher, published_date, page_count, language,
            user_uid, created_at, updated_at
        "#,
    )
    .bind(uid)
    .bind(changes.title)
    .bind(changes.author)
    .bind(changes.publisher)
    .bind(changes.published_date)
    .bind(changes.page_count)
    .bind(changes.language)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn delete(pool: &PgPool, uid: Uuid) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM books
        WHERE uid = $1
        "#,
    )
    .bind(uid)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
