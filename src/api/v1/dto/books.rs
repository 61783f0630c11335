/*
 * Responsibility
 * - Books request/response DTOs
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::book_repo::{BookChanges, BookRow, NewBook};

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
}

impl CreateBookRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.author.trim().is_empty() {
            return Err("author is required");
        }
        if self.publisher.trim().is_empty() {
            return Err("publisher is required");
        }
        if self.language.trim().is_empty() {
            return Err("language is required");
        }
        if self.page_count <= 0 {
            return Err("page_count must be positive");
        }
        Ok(())
    }

    pub fn as_new_book(&self) -> NewBook<'_> {
        NewBook {
            title: self.title.trim(),
            author: self.author.trim(),
            publisher: self.publisher.trim(),
            published_date: self.published_date,
            page_count: self.page_count,
            language: self.language.trim(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
}

impl UpdateBookRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        for field in [&self.title, &self.author, &self.publisher, &self.language] {
            if let Some(v) = field
                && v.trim().is_empty()
            {
                return Err("fields cannot be empty");
            }
        }
        if let Some(pages) = self.page_count
            && pages <= 0
        {
            return Err("page_count must be positive");
        }
        Ok(())
    }

    pub fn as_changes(&self) -> BookChanges<'_> {
        BookChanges {
            title: self.title.as_deref().map(str::trim),
            author: self.author.as_deref().map(str::trim),
            publisher: self.publisher.as_deref().map(str::trim),
            published_date: self.published_date,
            page_count: self.page_count,
            language: self.language.as_deref().map(str::trim),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
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

impl From<BookRow> for BookResponse {
    fn from(row: BookRow) -> Self {
        Self {
            uid: row.uid,
            title: row.title,
            author: row.author,
            publisher: row.publisher,
            published_date: row.published_date,
            page_count: row.page_count,
            language: row.language,
            user_uid: row.user_uid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_fields_and_positive_pages() {
        let req: CreateBookRequest = serde_json::from_value(serde_json::json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "publisher": "Chilton",
            "published_date": "1965-08-01",
            "page_count": 412,
            "language": "English"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.as_new_book().published_date, NaiveDate::from_ymd_opt(1965, 8, 1).unwrap());

        let bad = CreateBookRequest {
            page_count: 0,
            ..req
        };
        assert_eq!(bad.validate(), Err("page_count must be positive"));
    }

    #[test]
    fn update_rejects_blank_fields() {
        let req = UpdateBookRequest {
            title: Some("  ".into()),
            author: None,
            publisher: None,
            published_date: None,
            page_count: None,
            language: None,
        };
        assert_eq!(req.validate(), Err("fields cannot be empty"));
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(p.limit(), Pagination::MAX_LIMIT);
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            limit: None,
            offset: None,
        };
        assert_eq!(p.limit(), Pagination::DEFAULT_LIMIT);
    }
}
