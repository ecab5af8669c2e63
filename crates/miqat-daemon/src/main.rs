mod actors;
mod server;
mod services;

use std::sync::Arc;

use actors::{MicroTimerActor, NotifierActor, TimerActor, TimerServices};
use anyhow::{Context, Result};
use miqat_adapters::{AladhanPrayerTimesGateway, AlquranQuoteGateway, SqliteDocumentStore};
use miqat_core::ports::SettingsRepository;
use miqat_core::{AchievementLedger, AppState, Config};
use server::{Dispatcher, Server};
use services::{BoardService, EndMessageService, PrayerGate, SessionHistory};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("miqat_daemon=debug".parse()?))
        .init();

    info!("miqat daemon starting");

    let config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });

    let state = AppState::load_or_create().context("cannot start without a user identity")?;

    let database_path = config.storage.resolved_database_path();
    let store = Arc::new(
        SqliteDocumentStore::new(&database_path, state.user_id)
            .with_context(|| format!("failed to open store at {}", database_path.display()))?,
    );
    info!(?database_path, user_id = %state.user_id, "store opened");

    let settings = store
        .load_settings()
        .unwrap_or_else(|error| {
            warn!(%error, "failed to load settings, using defaults");
            None
        })
        .unwrap_or_default();

    let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("SIGINT received, initiating shutdown");
        shutdown_sender.send(()).ok();
    });

    let (notifier_actor, notifier_handle) = NotifierActor::new(
        config.notifications.urgency,
        config.notifications.sound_enabled,
    );
    tokio::spawn(notifier_actor.run());

    let ledger = Arc::new(AchievementLedger::new(store.clone()));
    let services = TimerServices {
        gate: PrayerGate::new(Arc::new(AladhanPrayerTimesGateway::new(
            config.services.prayer_times_url.clone(),
        ))),
        end_messages: EndMessageService::new(
            Arc::new(AlquranQuoteGateway::new(
                config.services.quotes_url.clone(),
                config.services.quote_edition.clone(),
            )),
            store.clone(),
        ),
        history: SessionHistory::new(store.clone(), ledger.clone()),
        settings: store.clone(),
    };

    let (timer_actor, timer_handle) = TimerActor::new(
        settings,
        services,
        Some(notifier_handle.clone()),
        Some(store.subscribe()),
    );
    tokio::spawn(timer_actor.run());

    let (micro_timer_actor, micro_timer_handle) = MicroTimerActor::new(Some(notifier_handle));
    tokio::spawn(micro_timer_actor.run());

    let board = BoardService::new(store.clone(), store.clone(), store.clone(), store, ledger);

    let server = Server::new(
        miqat_protocol::default_socket_path(),
        Dispatcher::new(timer_handle, micro_timer_handle, Arc::new(board)),
    );
    server.run(shutdown_receiver).await?;

    info!("miqat daemon stopped");
    Ok(())
}
