//! Nursery shop API server
//!
//! Main entry point for the nursery shop backend service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nursery_api::{AppState, SessionStore, create_router};
use nursery_core::invoice::ShopHeader;
use nursery_core::reports::ReportService;
use nursery_db::{UserRepository, connect_with, migration::Migrator};
use nursery_shared::{AppConfig, EmailService, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nursery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    let timezone = ReportService::parse_timezone(&config.shop.timezone)?;

    // Connect to database and bring the schema up to date
    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    UserRepository::new(db.clone())
        .ensure_default_admin(
            &config.bootstrap.admin_username,
            &config.bootstrap.admin_password,
        )
        .await?;

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .unwrap_or(i64::MAX),
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create email service
    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        otp_recipient: email_service.otp_recipient().to_string(),
        notifier: Arc::new(email_service),
        sessions: SessionStore::new(
            Duration::from_secs(config.otp.session_idle_secs),
            Duration::from_secs(config.otp.ttl_secs),
        ),
        shop: ShopHeader {
            name: config.shop.name.clone(),
            tagline: config.shop.tagline.clone(),
        },
        timezone,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, %timezone, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
