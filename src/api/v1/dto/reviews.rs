/*
 * Responsibility
 * - Reviews request/response DTOs
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::review_repo::ReviewRow;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub review_text: String,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=5).contains(&self.rating) {
            return Err("rating must be between 1 and 5");
        }
        if self.review_text.trim().is_empty() {
            return Err("review_text is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub uid: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub user_uid: Option<Uuid>,
    pub book_uid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for ReviewResponse {
    fn from(row: ReviewRow) -> Self {
        Self {
            uid: row.uid,
            rating: row.rating,
            review_text: row.review_text,
            user_uid: row.user_uid,
            book_uid: row.book_uid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
