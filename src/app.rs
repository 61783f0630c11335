/*
 * Responsibility
 * - Config loading -> dependency wiring -> Router assembly
 * - Middleware (CORS / request-id / trace / limits) applied to the whole app
 * - axum::serve() startup
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::{
    api,
    config::Config,
    error::AppError,
    middleware,
    services::{
        auth::build_token_authority, mailer::LogMailer, url_token::UrlTokenSigner,
    },
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,bookly=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting bookly in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = connect_db(&config).await?;
    let state = build_state(&config, db).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_db(config: &Config) -> Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("running migrations")?;

    Ok(db)
}

async fn build_state(config: &Config, db: PgPool) -> Result<AppState, AppError> {
    let auth = build_token_authority(config).await?;
    let url_tokens = UrlTokenSigner::new(
        &config.auth_config(),
        Duration::from_secs(config.url_token_ttl_seconds),
    )?;
    let mailer = Arc::new(LogMailer::new(config.mail_from.clone()));

    let public_base_url = Url::parse(&format!("http://{}/", config.domain)).map_err(|e| {
        tracing::error!(error = %e, domain = %config.domain, "DOMAIN is not a valid host");
        AppError::Internal
    })?;

    Ok(AppState::new(db, auth, url_tokens, mailer, public_base_url))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
