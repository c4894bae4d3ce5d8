//! `depot-worker` -- transfer event push fan-out service.
//!
//! Listens for new rows in `transfer_events`, resolves each event's
//! audience from the `recipients` table, pushes the notification through
//! FCM, and prunes device tokens FCM reports as dead.
//!
//! Configuration is read from the environment (and `.env` when present);
//! see [`WorkerConfig`](depot_worker::config::WorkerConfig).

use std::sync::Arc;

use anyhow::Context;
use depot_events::{EventBus, EventFeed, FcmTransport, PgRecipientDirectory, PushFanout};
use depot_worker::config::WorkerConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depot_worker=info,depot_events=info,depot_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env().context("Invalid worker configuration")?;
    tracing::info!(
        fcm_project = %config.fcm.project_id,
        max_connections = config.max_connections,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = depot_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    depot_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    depot_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- Engine ---
    let directory = Arc::new(PgRecipientDirectory::new(pool.clone()));
    let transport =
        Arc::new(FcmTransport::new(config.fcm.clone()).context("Failed to build FCM client")?);
    let fanout = Arc::new(PushFanout::new(directory, transport));

    let event_bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();

    let fanout_handle = tokio::spawn(fanout.run(event_bus.subscribe(), cancel.clone()));
    let mut feed_handle = tokio::spawn(
        EventFeed::new(pool.clone(), Arc::clone(&event_bus)).run(cancel.clone()),
    );
    tracing::info!("Push fan-out started");

    // --- Shutdown ---
    let feed_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
            feed_handle.await
        }
        result = &mut feed_handle => {
            cancel.cancel();
            result
        }
    };

    fanout_handle.await.context("Push fan-out task panicked")?;
    pool.close().await;

    feed_result
        .context("Event feed task panicked")?
        .context("Event feed failed")?;
    tracing::info!("Worker stopped");
    Ok(())
}
