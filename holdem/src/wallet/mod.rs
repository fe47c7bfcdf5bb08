//! Currency custody: where buy-ins come from and payouts go.
//!
//! The table never holds player funds outside its stacks. Joining and
//! rebuying withdraw from custody, leaving deposits the whole stack back.
//! [`CurrencyCustody`] is the seam the host implements; [`WalletManager`]
//! is an in-memory ledger used by the server binary and the tests.
//!
//! ## Example
//!
//! ```
//! use holdem::wallet::{CurrencyCustody, WalletManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let wallets = WalletManager::new();
//!     wallets.open_account(1, 5_000).await;
//!
//!     let balance = wallets.withdraw(1, 2_000).await.unwrap();
//!     assert_eq!(balance, 3_000);
//! }
//! ```

use async_trait::async_trait;

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use manager::WalletManager;
pub use models::{EntryDirection, Wallet, WalletEntry};

use crate::game::entities::{Chips, PlayerId};

/// Moves chips between a player's funds and the table.
#[async_trait]
pub trait CurrencyCustody: Send + Sync {
    /// Takes `amount` from the player's funds. Returns the remaining balance.
    async fn withdraw(&self, player: PlayerId, amount: Chips) -> WalletResult<i64>;

    /// Pays `amount` back into the player's funds. Returns the new balance.
    async fn deposit(&self, player: PlayerId, amount: Chips) -> WalletResult<i64>;
}
