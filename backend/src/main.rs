//! IdeaHub entry-point: loads configuration, prepares the database and serves
//! the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ideahub::domain::{PasswordHasher, SeedOutcome, TokenIssuer, seed_super_admin};
use ideahub::inbound::http::health::HealthState;
use ideahub::inbound::http::session_config::{BuildMode, load_session_settings};
use ideahub::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig, run_migrations};
use ideahub::settings::IdeaHubSettings;

use server::{ServerConfig, StateInputs, build_http_state, build_mailer, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = IdeaHubSettings::load().wrap_err("failed to load configuration")?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let database_url = settings.database_url()?;
    run_migrations(database_url).await?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to build database pool")?;

    let hasher = Arc::new(PasswordHasher::default());
    if let Some(seed) = settings.admin_seed()? {
        let users = DieselUserRepository::new(pool.clone());
        match seed_super_admin(&users, &hasher, clock.as_ref(), seed).await? {
            SeedOutcome::Created(user_id) => info!(%user_id, "seeded super admin"),
            SeedOutcome::AlreadyPresent => info!("super admin already present"),
        }
    }

    let tokens = Arc::new(
        TokenIssuer::new(&settings.jwt_settings()?, clock.clone())
            .wrap_err("invalid JWT signing key")?,
    );
    let http_state = build_http_state(StateInputs {
        pool,
        tokens,
        hasher,
        clock,
        mailer: build_mailer(settings.email_api()?)?,
        auth: settings.auth_settings()?,
        frontend_url: settings.frontend_url().to_owned(),
    });

    let session = load_session_settings(
        &settings.session_key_file(),
        settings.cookie_secure(),
        BuildMode::from_debug_assertions(),
    )?;
    let config = ServerConfig::new(session, settings.bind_addr()?, http_state);
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    health_state.mark_ready();
    info!(%bind_addr, "IdeaHub listening");

    let shutdown_state = health_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_state.mark_unhealthy();
        }
    });

    server.await?;
    Ok(())
}
