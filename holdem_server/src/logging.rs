//! Structured logging configuration.
//!
//! The table library logs through the `log` facade; the subscriber installed
//! here forwards those records so both end up in the same output.

use holdem::TableEvent;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the RUST_LOG env var.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,holdem=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log a public table event with structured data
///
/// Private messages are logged at debug level only.
pub fn log_table_event(event: &TableEvent) {
    match event {
        TableEvent::Announcement(text) => {
            tracing::info!(target: "table", "{text}");
        }
        TableEvent::Said { player, text } => {
            tracing::info!(target: "table", player = player, "{text}");
        }
        TableEvent::Direct { player, text } => {
            tracing::debug!(target: "table", player = player, "(private) {text}");
        }
        TableEvent::HandFinished { hand_id, pot } => {
            tracing::info!(target: "table", %hand_id, pot = pot, "Hand finished");
        }
        other => {
            tracing::debug!(target: "table", "{other}");
        }
    }
}
