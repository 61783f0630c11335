/*
 * Responsibility
 * - /users handlers: signup, verify, login, refresh, me, logout, password reset
 * - Token decisions are made by the guard (TokenAuthority); handlers only
 *   see AuthCtx
 */
use axum::{Json, extract::State, http::StatusCode};
use tracing::{error, info, warn};

use crate::{
    api::v1::{
        dto::users::{
            AccessTokenResponse, LoginRequest, LoginResponse, LoginUser, MessageResponse,
            PasswordResetConfirmRequest, PasswordResetRequest, SignupRequest, SignupResponse,
            UserResponse, UserWithBooksResponse, normalize_email,
        },
        extractors::{AuthCtxExtractor, JsonBody, PathParam},
    },
    error::AppError,
    repos::{
        book_repo,
        user_repo::{self, NewUser, UserRow},
    },
    services::{
        auth::{TokenKind, UserClaim},
        mailer::MailMessage,
        password,
        url_token::UrlTokenPurpose,
    },
    state::AppState,
};

const BEARER: &str = "Bearer";

fn link_for(state: &AppState, path: String) -> Result<String, AppError> {
    state.link(&path).map(String::from).map_err(|e| {
        error!(error = %e, "building email link failed");
        AppError::Internal
    })
}

/// Delivery failures are logged, never returned to the caller.
async fn send_best_effort(state: &AppState, message: MailMessage, kind: &'static str) -> bool {
    match state.mailer.send(message).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, mail = kind, "mail not sent");
            false
        }
    }
}

fn claim_for(user: &UserRow) -> UserClaim {
    UserClaim::new(user.email.clone(), user.uid, Some(user.role.clone()))
}

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("invalid_request", msg))?;

    let email = normalize_email(&req.email);
    if user_repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::UserAlreadyExists);
    }

    let password_hash = password::hash_password(req.password).await?;
    let user = user_repo::create(
        &state.db,
        NewUser {
            username: req.username.trim(),
            email: &email,
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            password_hash: &password_hash,
        },
    )
    .await
    .map_err(|e| match AppError::from(e) {
        // lost a race with another signup for the same email
        AppError::Conflict => AppError::UserAlreadyExists,
        other => other,
    })?;

    let token = state.url_tokens.create(&email, UrlTokenPurpose::VerifyEmail)?;
    let link = link_for(&state, format!("api/v1/users/verify/{token}"))?;
    let message = MailMessage::new(
        vec![email.clone()],
        "Verify your email",
        format!(r#"<h1>Verify your email</h1><p>Please click <a href="{link}">this link</a> to verify your email.</p>"#),
    );
    // The account exists either way; a lost mail can be requested again.
    send_best_effort(&state, message, "verification").await;

    info!(user_uid = %user.uid, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Account created! Check your email to verify your account.".to_string(),
            user: user.into(),
        }),
    ))
}

pub async fn verify_account(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = state.url_tokens.decode(&token, UrlTokenPurpose::VerifyEmail)?;

    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::not_found("user"))?;
    user_repo::mark_verified(&state.db, user.uid)
        .await?
        .ok_or(AppError::not_found("user"))?;

    info!(user_uid = %user.uid, "account verified");
    Ok(Json(MessageResponse::new("Account verified successfully.")))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = normalize_email(&req.email);

    // Unknown email and wrong password look the same to the caller.
    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    if !password::verify_password(req.password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let pair = state.auth.issue_pair(&claim_for(&user))?;
    info!(user_uid = %user.uid, "login");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: BEARER,
        user: LoginUser {
            email: user.email,
            uid: user.uid,
        },
    }))
}

/// Guarded with `TokenKind::Refresh`. The role comes from the directory, not
/// from the refresh token.
pub async fn refresh_access_token(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let user = user_repo::get(&state.db, ctx.user_uid)
        .await?
        .ok_or(AppError::not_found("user"))?;

    let access_token = state
        .auth
        .issue(claim_for(&user), TokenKind::Access, None)?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: BEARER,
        expires_in: state.auth.access_ttl().as_secs(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserWithBooksResponse>, AppError> {
    let user = user_repo::get(&state.db, ctx.user_uid)
        .await?
        .ok_or(AppError::not_found("user"))?;
    let books = book_repo::list_by_user(&state.db, user.uid).await?;

    Ok(Json(UserWithBooksResponse {
        user: UserResponse::from(user),
        books: books.into_iter().map(Into::into).collect(),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.revoke(&ctx.jti).await?;
    info!(user_uid = %ctx.user_uid, "logout");

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

pub async fn password_reset_request(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = normalize_email(&req.email);

    // Same answer whether or not the account exists.
    if let Some(user) = user_repo::find_by_email(&state.db, &email).await? {
        let token = state
            .url_tokens
            .create(&user.email, UrlTokenPurpose::PasswordReset)?;
        let link = link_for(&state, format!("api/v1/users/password-reset-confirm/{token}"))?;
        let message = MailMessage::new(
            vec![user.email.clone()],
            "Reset your password",
            format!(r#"<h1>Reset your password</h1><p>Please click <a href="{link}">this link</a> to reset your password.</p>"#),
        );
        // The answer must not depend on delivery either.
        send_best_effort(&state, message, "password reset").await;
    }

    Ok(Json(MessageResponse::new(
        "Please check your email for instructions to reset your password.",
    )))
}

pub async fn password_reset_confirm(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
    JsonBody(req): JsonBody<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("invalid_request", msg))?;

    let email = state.url_tokens.decode(&token, UrlTokenPurpose::PasswordReset)?;
    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::not_found("user"))?;

    let password_hash = password::hash_password(req.new_password).await?;
    user_repo::set_password_hash(&state.db, user.uid, &password_hash)
        .await?
        .ok_or(AppError::not_found("user"))?;

    info!(user_uid = %user.uid, "password reset");
    Ok(Json(MessageResponse::new("Password reset successfully.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::{MailError, Mailer};
    use crate::state::test_support::test_state;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct BrokenMailer;

    #[async_trait]
    impl Mailer for BrokenMailer {
        async fn send(&self, _message: MailMessage) -> Result<(), MailError> {
            Err(MailError::Transport("smtp down".into()))
        }
    }

    #[tokio::test]
    async fn mail_failures_are_swallowed() {
        let mut state = test_state();
        let message = || MailMessage::new(vec!["a@b.c".to_string()], "subject", "<p>body</p>");

        assert!(send_best_effort(&state, message(), "verification").await);

        state.mailer = Arc::new(BrokenMailer);
        assert!(!send_best_effort(&state, message(), "password reset").await);
    }
}
