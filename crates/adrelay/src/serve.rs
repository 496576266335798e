// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `adrelay serve` command implementation.
//!
//! Wires the SQLite listing store, the Telegram transport, the media-group
//! aggregator, and the forwarding scheduler together, then runs until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use adrelay_config::model::AdrelayConfig;
use adrelay_core::{HealthStatus, ListingStore, PluginAdapter, RelayError, Transport};
use adrelay_engine::{
    shutdown, Aggregator, ControlState, Dispatcher, ForwardingScheduler, Operations, Throttle,
};
use adrelay_storage::SqliteStorage;
use adrelay_telegram::{ingress, TelegramTransport};

/// Initialize the tracing subscriber from the configured log level,
/// honoring `RUST_LOG` when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the `adrelay serve` command.
///
/// Supports graceful shutdown via SIGINT/SIGTERM: the scheduler loop exits,
/// long polling is stopped, and the store is checkpointed.
pub async fn run_serve(config: AdrelayConfig) -> Result<(), RelayError> {
    init_tracing(&config.relay.log_level);

    info!("starting adrelay serve");

    // Storage.
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    let store: Arc<dyn ListingStore> = storage.clone();

    // Telegram transport.
    let transport = Arc::new(TelegramTransport::new(config.telegram.clone())?);
    match transport.health_check().await {
        Ok(HealthStatus::Healthy) => info!("Telegram bot reachable"),
        Ok(status) => warn!(?status, "Telegram bot health check degraded"),
        Err(e) => warn!(error = %e, "Telegram bot health check failed"),
    }
    let transport_dyn: Arc<dyn Transport> = transport.clone();

    // Dispatch failure notices go to the configured chat, falling back to
    // the first operator.
    let notify_chat = config
        .telegram
        .notify_chat
        .or_else(|| config.telegram.admin_ids.first().copied());

    let control = Arc::new(ControlState::new());
    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        transport_dyn,
        config.telegram.target_chats.clone(),
        notify_chat,
        &config.telegram.footer_links,
    ));
    let ops = Arc::new(Operations::new(
        store.clone(),
        dispatcher.clone(),
        control.clone(),
    ));
    let aggregator = Aggregator::new(
        store.clone(),
        Duration::from_secs(config.relay.media_group_grace_secs),
    );

    let scheduler = ForwardingScheduler::new(
        store.clone(),
        dispatcher,
        control,
        config.telegram.source_chats.clone(),
        config.relay.boost_every,
        Throttle::from_secs(config.relay.interval_secs),
    );

    // Publish the operator command menu; not fatal when Telegram is down.
    if let Err(e) = ingress::register_command_menu(transport.bot()).await {
        warn!(error = %e, "failed to register bot command menu");
    }

    // Inbound long polling: fragments and operator commands.
    let polling = ingress::spawn(
        transport.bot().clone(),
        aggregator,
        ops,
        config.telegram.clone(),
    );

    // The scheduler owns the foreground until a shutdown signal arrives.
    let cancel = shutdown::install_signal_handler();
    scheduler.run(cancel).await;

    polling.abort();
    store.close().await?;

    info!("adrelay stopped");
    Ok(())
}
