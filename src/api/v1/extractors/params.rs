/*
 * Responsibility
 * - Path / Query / Json wrappers whose rejections become AppError, so a bad
 *   uuid or a broken body gets the same JSON error body as everything else
 * - Handlers use these instead of the axum extractors of the same shape
 */
use axum::{
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::AppError;

/// `Path<T>` with `invalid_path` (400) on failure.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

/// `Query<T>` with `invalid_query` (400) on failure.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

/// `Json<T>` with `invalid_body` (400) on failure.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // MissingPathParams etc.: the route and handler disagree, not the client.
        if rejection.status().is_server_error() {
            error!(error = %rejection.body_text(), "path extraction misconfigured");
            return AppError::Internal;
        }
        AppError::bad_request("invalid_path", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request("invalid_query", rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request("invalid_body", rejection.body_text())
    }
}

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
