/*
 * Responsibility
 * - /reviews handlers (reviews hang off a book)
 */
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::reviews::{CreateReviewRequest, ReviewResponse},
        extractors::{AuthCtxExtractor, JsonBody, PathParam},
    },
    error::AppError,
    repos::{book_repo, review_repo},
    services::auth::AuthError,
    state::AppState,
};

pub async fn list_book_reviews(
    State(state): State<AppState>,
    PathParam(book_uid): PathParam<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let rows = review_repo::list_for_book(&state.db, book_uid).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn add_review(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    PathParam(book_uid): PathParam<Uuid>,
    JsonBody(req): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("invalid_request", msg))?;

    book_repo::get(&state.db, book_uid)
        .await?
        .ok_or(AppError::not_found("book"))?;

    let row = review_repo::create(
        &state.db,
        book_uid,
        ctx.user_uid,
        req.rating,
        req.review_text.trim(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn get_review(
    State(state): State<AppState>,
    PathParam(review_uid): PathParam<Uuid>,
) -> Result<Json<ReviewResponse>, AppError> {
    let row = review_repo::get(&state.db, review_uid)
        .await?
        .ok_or(AppError::not_found("review"))?;
    Ok(Json(row.into()))
}

pub async fn delete_review(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    PathParam(review_uid): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = review_repo::get(&state.db, review_uid)
        .await?
        .ok_or(AppError::not_found("review"))?;
    if !ctx.can_modify(existing.user_uid) {
        return Err(AuthError::InsufficientPermission.into());
    }

    if review_repo::delete(&state.db, review_uid).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("review"))
    }
}
