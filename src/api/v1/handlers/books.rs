/*
 * Responsibility
 * - /books handlers
 * - writes are limited to the submitting user or an admin
 */
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::books::{BookResponse, CreateBookRequest, Pagination, UpdateBookRequest},
        extractors::{AuthCtxExtractor, JsonBody, PathParam, QueryParams},
    },
    error::AppError,
    repos::book_repo,
    services::auth::AuthError,
    state::AppState,
};

pub async fn list_books(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let rows = book_repo::list(&state.db, page.limit(), page.offset()).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn list_user_books(
    State(state): State<AppState>,
    PathParam(user_uid): PathParam<Uuid>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let rows = book_repo::list_by_user(&state.db, user_uid).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn get_book(
    State(state): State<AppState>,
    PathParam(book_uid): PathParam<Uuid>,
) -> Result<Json<BookResponse>, AppError> {
    let row = book_repo::get(&state.db, book_uid)
        .await?
        .ok_or(AppError::not_found("book"))?;
    Ok(Json(row.into()))
}

pub async fn create_book(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    JsonBody(req): JsonBody<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("invalid_request", msg))?;

    let row = book_repo::create(&state.db, req.as_new_book(), ctx.user_uid).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_book(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    PathParam(book_uid): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateBookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("invalid_request", msg))?;

    let existing = book_repo::get(&state.db, book_uid)
        .await?
        .ok_or(AppError::not_found("book"))?;
    if !ctx.can_modify(existing.user_uid) {
        return Err(AuthError::InsufficientPermission.into());
    }

    let row = book_repo::update(&state.db, book_uid, req.as_changes())
        .await?
        .ok_or(AppError::not_found("book"))?;
    Ok(Json(row.into()))
}

pub async fn delete_book(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    PathParam(book_uid): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = book_repo::get(&state.db, book_uid)
        .await?
        .ok_or(AppError::not_found("book"))?;
    if !ctx.can_modify(existing.user_uid) {
        return Err(AuthError::InsufficientPermission.into());
    }

    if book_repo::delete(&state.db, book_uid).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("book"))
    }
}
