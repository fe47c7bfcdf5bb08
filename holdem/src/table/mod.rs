//! Table actor: one tokio task per table serializing every mutation.
//!
//! This module implements:
//! - TableActor: async actor owning a [`PokerTable`](crate::game::PokerTable)
//! - TableHandle: cloneable sender used by hosts, bots and tests
//! - Message-based communication with tokio channels
//! - Table configuration and validation
//!
//! ## Architecture
//!
//! The actor owns the table clock. The clock only runs while at least one
//! player is seated, and ticks and messages are handled by a single
//! `tokio::select!` loop, so a tick can never interleave with a player's
//! action. Custody calls are awaited inside the loop; hand exports are
//! pushed to an [`ExportQueue`](crate::export::ExportQueue) and never
//! awaited.
//!
//! ## Example
//!
//! ```no_run
//! use holdem::table::{TableActor, TableConfig};
//! use holdem::wallet::WalletManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let wallets = Arc::new(WalletManager::new());
//!     let (actor, handle) = TableActor::new(1, TableConfig::default(), wallets, None);
//!
//!     tokio::spawn(actor.run());
//!
//!     let state = handle.state().await.unwrap();
//!     println!("{} has {} players", state.table_name, state.player_count);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::{ConfigError, TableConfig};
pub use messages::{TableMessage, TableNotification, TableResponse, TableStateResponse};

/// Table ID type
pub type TableId = i64;
