use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use installment_ledger::config::{Config, LogFormat, StorageBackend};
use installment_ledger::middleware::{RateLimiter, RequestId};
use installment_ledger::modules::notifications::{
    LogNotificationSink, MySqlNotificationSink, NotificationDispatcher, NotificationSink,
};
use installment_ledger::modules::notifications::repositories::NotificationRepository;
use installment_ledger::{configure_app, AppServices, InMemoryLedgerStore, LedgerStore, MySqlLedgerStore};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "installment_ledger=debug,actix_web=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    init_tracing(config.app.log_format);

    tracing::info!("Starting Installment Ledger");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let (store, sink): (Arc<dyn LedgerStore>, Arc<dyn NotificationSink>) = match config.storage {
        StorageBackend::Mysql => {
            let database = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for MySQL storage")?;
            let pool = database
                .create_pool()
                .await
                .context("Failed to create database pool")?;

            tracing::info!(
                "Database pool initialized ({} connections)",
                database.pool_size
            );

            if config.ledger.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            let sink: Arc<dyn NotificationSink> = Arc::new(MySqlNotificationSink::new(
                NotificationRepository::new(pool.clone()),
            ));
            let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(pool));
            (store, sink)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory ledger storage; state is lost on restart");
            let sink: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink);
            let memory = InMemoryLedgerStore::new();
            memory
                .seed_demo_catalog()
                .await
                .context("Failed to seed demo catalog")?;
            let store: Arc<dyn LedgerStore> = Arc::new(memory);
            (store, sink)
        }
    };

    let notifications = if config.ledger.notifications_enabled {
        NotificationDispatcher::new(sink)
    } else {
        NotificationDispatcher::disabled()
    };

    let services = AppServices::new(store, notifications);
    let rate_limiter = RateLimiter::new(config.ledger.rate_limit_per_minute);

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Cors::permissive())
            .wrap(rate_limiter.clone())
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(|cfg| configure_app(cfg, &services))
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}
