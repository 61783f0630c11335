/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - db: PgPool, auth: TokenAuthority, url_tokens, mailer, public base url
 * - Cheap to Clone (everything inside is Arc/Clone cheap)
 */
use std::sync::Arc;

use sqlx::PgPool;
use url::Url;

use crate::services::{auth::TokenAuthority, mailer::Mailer, url_token::UrlTokenSigner};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<TokenAuthority>,
    pub url_tokens: UrlTokenSigner,
    pub mailer: Arc<dyn Mailer>,
    // Base for links sent by email, e.g. `http://bookly.example/`
    pub public_base_url: Url,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("public_base_url", &self.public_base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        db: PgPool,
        auth: Arc<TokenAuthority>,
        url_tokens: UrlTokenSigner,
        mailer: Arc<dyn Mailer>,
        public_base_url: Url,
    ) -> Self {
        Self {
            db,
            auth,
            url_tokens,
            mailer,
            public_base_url,
        }
    }

    /// Absolute link under the public base url, e.g. `api/v1/users/verify/<token>`.
    pub fn link(&self, path: &str) -> Result<Url, url::ParseError> {
        self.public_base_url.join(path)
    }
}
