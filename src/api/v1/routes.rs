/*
 * Responsibility
 * - v1 URL layout
 * - Each protected method declares its token kind and permission set here;
 *   the guard runs before the handler (route_layer)
 */
use axum::{
    Router,
    routing::{MethodRouter, delete, get, patch, post},
};

use crate::api::v1::handlers::{
    books::{create_book, delete_book, get_book, list_books, list_user_books, update_book},
    health::health,
    reviews::{add_review, delete_review, get_review, list_book_reviews},
    users::{
        login, logout, me, password_reset_confirm, password_reset_request, refresh_access_token,
        signup, verify_account,
    },
};
use crate::middleware::auth::guard::protect;
use crate::services::auth::{PermissionSet, TokenKind};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let access = |route: MethodRouter<AppState>, permissions: PermissionSet| {
        protect(route, &state, TokenKind::Access, permissions)
    };

    Router::new()
        .route("/health", get(health))
        // users
        .route("/users/signup", post(signup))
        .route("/users/verify/{token}", get(verify_account))
        .route("/users/login", post(login))
        .route(
            "/users/refresh-token",
            protect(
                get(refresh_access_token),
                &state,
                TokenKind::Refresh,
                PermissionSet::ANY,
            ),
        )
        .route("/users/me", access(get(me), PermissionSet::MEMBERS))
        .route("/users/logout", access(get(logout), PermissionSet::ANY))
        .route("/users/password-reset-request", post(password_reset_request))
        .route(
            "/users/password-reset-confirm/{token}",
            post(password_reset_confirm),
        )
        // books
        .route(
            "/books",
            access(get(list_books), PermissionSet::ANY)
                .merge(access(post(create_book), PermissionSet::MEMBERS)),
        )
        .route(
            "/books/{book_uid}",
            access(get(get_book), PermissionSet::ANY).merge(access(
                patch(update_book).delete(delete_book),
                PermissionSet::MEMBERS,
            )),
        )
        .route(
            "/books/user/{user_uid}",
            access(get(list_user_books), PermissionSet::ANY),
        )
        // reviews
        .route(
            "/reviews/book/{book_uid}",
            access(get(list_book_reviews), PermissionSet::ANY)
                .merge(access(post(add_review), PermissionSet::MEMBERS)),
        )
        .route(
            "/reviews/{review_uid}",
            access(get(get_review), PermissionSet::ANY)
                .merge(access(delete(delete_review), PermissionSet::MEMBERS)),
        )
}
