//! Single-table Hold'em server.
//!
//! Runs one table actor on its own clock and fills the seats with local
//! bots. Completed hands are appended to a JSON lines file when an export
//! path is configured.

mod bots;
mod config;
mod logging;

use std::{path::PathBuf, sync::Arc};

use anyhow::Error;
use holdem::{
    TableActor, TableEvent, TableHandle, TableNotification, WalletManager,
    entities::PlayerId,
    export::{ExportQueue, JsonLinesSink},
};
use pico_args::Arguments;
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{error, info, warn};

use bots::Bot;
use config::ServerConfig;

const HELP: &str = "\
Run a single Texas Hold'em table with local bots

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bots       N           Number of bots to seat      [default: env BOT_COUNT or 4]
  --export     PATH        Append completed hands here [default: env EXPORT_PATH]
  --hands      N           Stop after N hands          [default: env MAX_HANDS or unlimited]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TABLE_NAME, TABLE_MAX_PLAYERS, TABLE_SMALL_BLIND, TABLE_BIG_BLIND
  TABLE_MIN_BUY_IN, TABLE_MAX_BUY_IN, TABLE_TURN_SECS
  TABLE_INTERMISSION_SECS, TABLE_REJOIN_COOLDOWN_SECS, TICK_MILLIS
  STARTING_BALANCE, BOT_BUY_IN, BOT_THINK_MILLIS, EXPORT_MAX_ATTEMPTS
  RUST_LOG                 Log filter (e.g. info,table=debug)
";

/// Subscriber id used by the server's own event log.
const OBSERVER_ID: PlayerId = 0;

const TABLE_ID: i64 = 1;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bots_override: Option<usize> = pargs.opt_value_from_str("--bots")?;
    let export_override: Option<PathBuf> = pargs.opt_value_from_str("--export")?;
    let hands_override: Option<u64> = pargs.opt_value_from_str("--hands")?;
    let leftover = pargs.finish();

    logging::init();
    if !leftover.is_empty() {
        warn!("Ignoring unknown arguments: {leftover:?}");
    }

    let config = ServerConfig::from_env(bots_override, export_override, hands_override)?;
    info!(
        "Starting table '{}' with {} bots, blinds {}/{}",
        config.table.name, config.bots.count, config.table.small_blind, config.table.big_blind
    );

    let wallets = Arc::new(WalletManager::new());

    let (exporter, export_worker) = match &config.export_path {
        Some(path) => {
            info!("Exporting completed hands to {}", path.display());
            let sink = Arc::new(JsonLinesSink::new(path));
            let (queue, worker) = ExportQueue::spawn(sink, config.export_retry);
            (Some(queue), Some(worker))
        }
        None => (None, None),
    };

    let (actor, handle) = TableActor::new(TABLE_ID, config.table.clone(), wallets.clone(), exporter);
    let actor_task = tokio::spawn(actor.run());

    let notifications = handle
        .subscribe(OBSERVER_ID)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to subscribe to the table: {e}"))?;
    let mut observer = tokio::spawn(observe(notifications, config.max_hands));

    let mut bots = JoinSet::new();
    for seat in 0..config.bots.count {
        let id = seat as PlayerId + 1;
        wallets.open_account(id, config.bots.starting_balance).await;
        let bot = Bot::new(id, seat, handle.clone(), config.bots.think_time);
        bots.spawn(bot.run(config.bots.buy_in));
    }

    info!("Table is running. Press Ctrl+C to stop.");

    tokio::select! {
        () = shutdown_signal() => info!("Interrupted"),
        reason = &mut observer => match reason {
            Ok(reason) => info!("{reason}"),
            Err(e) => error!("Observer failed: {e}"),
        },
        () = async { while bots.join_next().await.is_some() {} } => {
            info!("Every bot has left the table");
        }
    }

    shutdown(handle, actor_task, bots, observer).await;

    if let Some(worker) = export_worker {
        match worker.await {
            Ok(stats) => info!(
                "Export finished: {} delivered, {} dropped, {} retries",
                stats.delivered, stats.dropped, stats.retries
            ),
            Err(e) => error!("Export worker failed: {e}"),
        }
    }

    for seat in 0..config.bots.count {
        let id = seat as PlayerId + 1;
        if let Ok(balance) = wallets.balance(id).await {
            info!("bot{seat} finished with {balance} in the bank");
        }
    }
    info!("Total balance: {}", wallets.total_balance().await);

    Ok(())
}

/// Logs table events until the table closes, `max_hands` hands finish or
/// too few players are left to deal another hand.
async fn observe(
    mut notifications: mpsc::Receiver<TableNotification>,
    max_hands: Option<u64>,
) -> &'static str {
    let mut hands = 0u64;
    let mut seated = 0usize;
    let mut dealing = false;
    while let Some(notification) = notifications.recv().await {
        let TableNotification::Event(event) = notification else {
            continue;
        };
        logging::log_table_event(&event);
        match event {
            TableEvent::PlayerJoined { .. } => {
                seated += 1;
                dealing |= seated > 1;
            }
            TableEvent::PlayerLeft { .. } => {
                seated = seated.saturating_sub(1);
                if dealing && seated < 2 {
                    return "Not enough players left";
                }
            }
            TableEvent::HandFinished { .. } => {
                hands += 1;
                if max_hands.is_some_and(|max| hands >= max) {
                    return "Hand limit reached";
                }
            }
            _ => {}
        }
    }
    "Table closed"
}

/// Closes the table, paying every seat back, and waits for the tasks
/// talking to it.
async fn shutdown(
    handle: TableHandle,
    actor_task: tokio::task::JoinHandle<()>,
    mut bots: JoinSet<()>,
    observer: tokio::task::JoinHandle<&'static str>,
) {
    info!("Shutting down table...");
    let response = handle.close().await;
    if let Some(message) = response.error_message() {
        warn!("Table did not close cleanly: {message}");
    }
    drop(handle);

    if let Err(e) = actor_task.await {
        error!("Table actor failed: {e}");
    }
    // Their notification channels are closed by now.
    while bots.join_next().await.is_some() {}
    observer.abort();
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
}
