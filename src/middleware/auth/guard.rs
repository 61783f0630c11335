//! Bearer token guard: header -> authorize -> permission check -> AuthCtx in extensions.
//!
//! Each protected route declares the token kind it needs and the roles it
//! admits:
//! ```ignore
//! .route("/logout", guard::protect(get(logout), &state, TokenKind::Access, PermissionSet::ANY))
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{PermissionSet, TokenKind};
use crate::state::AppState;

#[derive(Clone)]
struct Guard {
    state: AppState,
    kind: TokenKind,
    permissions: PermissionSet,
}

/// Wrap `route` so only requests with an authorized token of `kind`, whose
/// role is in `permissions`, reach the handler.
pub fn protect(
    route: MethodRouter<AppState>,
    state: &AppState,
    kind: TokenKind,
    permissions: PermissionSet,
) -> MethodRouter<AppState> {
    let guard = Guard {
        state: state.clone(),
        kind,
        permissions,
    };
    // route_layer: unmatched methods still get 405 instead of 401
    route.route_layer(middleware::from_fn_with_state(guard, guard_middleware))
}

/// `Authorization: Bearer <token>` -> `<token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let (scheme, token) = value.split_once(' ').ok_or(AppError::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(token)
}

async fn guard_middleware(
    State(guard): State<Guard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?.to_owned();

    // signature/expiry -> kind -> blocklist
    let claims = guard.state.auth.authorize(&token, guard.kind).await?;

    guard.permissions.check(&claims)?;

    // middleware -> extractor
    req.extensions_mut().insert(AuthCtx::from_claims(claims));

    Ok(next.run(req).await)
}
