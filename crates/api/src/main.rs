use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chatlink_bot::BotServices;
use chatlink_core::clock::{Clock, SystemClock};
use chatlink_db::{MemoryStore, Stores};
use chatlink_telegram::{ChatTransport, DryRunTransport, TelegramClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatlink_api::background::eod_reminders::EodReminderJob;
use chatlink_api::background::update_log_purge;
use chatlink_api::config::{ServerConfig, StoreBackend, TelegramMode};
use chatlink_api::router::build_app_router;
use chatlink_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store_backend,
        telegram_mode = ?config.telegram.mode,
        relink_policy = %config.relink_policy,
        "Loaded server configuration"
    );

    // --- Storage ---
    let stores = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let pool = chatlink_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            chatlink_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            chatlink_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Stores::postgres(pool)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; all state is lost on restart");
            Stores::memory(Arc::new(MemoryStore::new()))
        }
    };

    // --- Transport ---
    let transport: Arc<dyn ChatTransport> = match config.telegram.mode {
        TelegramMode::Live => {
            let token = config
                .telegram
                .bot_token
                .as_deref()
                .expect("TELEGRAM_BOT_TOKEN must be set");
            Arc::new(
                TelegramClient::new(config.telegram.api_base.clone(), token)
                    .expect("Failed to build the Telegram client"),
            )
        }
        TelegramMode::DryRun => {
            tracing::warn!("Telegram dry-run mode: outbound messages are only logged");
            Arc::new(DryRunTransport::new())
        }
    };

    // --- Bot services ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let services = BotServices::new(&stores, transport, clock.clone(), config.bot_config());

    // --- Background jobs ---
    let cancel = CancellationToken::new();

    let purge_handle = tokio::spawn(update_log_purge::run(
        stores.updates.clone(),
        clock.clone(),
        cancel.clone(),
    ));

    let reminder_job = EodReminderJob::new(
        services.links.clone(),
        stores.directory.clone(),
        services.dispatcher.clone(),
        clock,
        config.eod_reminder_hour,
    );
    let reminder_handle = tokio::spawn(reminder_job.run(cancel.clone()));

    tracing::info!("Background jobs started (update log purge, EOD reminders)");

    // --- App state ---
    let state = AppState {
        services,
        stores,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), purge_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), reminder_handle).await;
    tracing::info!("Background jobs stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chatlink_api=debug,chatlink_bot=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
