//! In-memory wallet manager with a ledger of every transfer.

use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use super::{
    CurrencyCustody,
    errors::{WalletError, WalletResult},
    models::{EntryDirection, Wallet, WalletEntry},
};
use crate::game::entities::{Chips, PlayerId};

#[derive(Debug, Default)]
struct Ledger {
    wallets: HashMap<PlayerId, Wallet>,
    entries: Vec<WalletEntry>,
}

/// Wallet manager
#[derive(Clone, Debug, Default)]
pub struct WalletManager {
    ledger: Arc<Mutex<Ledger>>,
}

impl WalletManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a wallet for a player, or reset an existing one
    pub async fn open_account(&self, player: PlayerId, balance: i64) {
        let now = Utc::now();
        let mut ledger = self.ledger.lock().await;
        ledger.wallets.insert(
            player,
            Wallet {
                player_id: player,
                balance,
                created_at: now,
                updated_at: now,
            },
        );
    }

    /// Get wallet for a player
    pub async fn get_wallet(&self, player: PlayerId) -> WalletResult<Wallet> {
        let ledger = self.ledger.lock().await;
        ledger
            .wallets
            .get(&player)
            .cloned()
            .ok_or(WalletError::WalletNotFound(player))
    }

    pub async fn balance(&self, player: PlayerId) -> WalletResult<i64> {
        Ok(self.get_wallet(player).await?.balance)
    }

    /// Get ledger entries for a player, oldest first
    pub async fn get_entries(&self, player: PlayerId) -> Vec<WalletEntry> {
        let ledger = self.ledger.lock().await;
        ledger
            .entries
            .iter()
            .filter(|entry| entry.player_id == player)
            .cloned()
            .collect()
    }

    /// Sum of every wallet balance
    pub async fn total_balance(&self) -> i64 {
        let ledger = self.ledger.lock().await;
        ledger.wallets.values().map(|w| w.balance).sum()
    }

    async fn transfer(
        &self,
        player: PlayerId,
        amount: Chips,
        direction: EntryDirection,
    ) -> WalletResult<i64> {
        let amount = i64::from(amount);
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let mut ledger = self.ledger.lock().await;
        let wallet = ledger
            .wallets
            .get_mut(&player)
            .ok_or(WalletError::WalletNotFound(player))?;

        let balance_after = match direction {
            EntryDirection::Debit if wallet.balance < amount => {
                return Err(WalletError::InsufficientBalance {
                    available: wallet.balance,
                    required: amount,
                });
            }
            EntryDirection::Debit => wallet.balance - amount,
            EntryDirection::Credit => wallet.balance + amount,
        };
        let now = Utc::now();
        wallet.balance = balance_after;
        wallet.updated_at = now;

        let id = i64::try_from(ledger.entries.len()).map_or(i64::MAX, |n| n + 1);
        ledger.entries.push(WalletEntry {
            id,
            player_id: player,
            amount,
            balance_after,
            direction,
            created_at: now,
        });

        log::debug!("Wallet {player}: {direction} {amount}, balance {balance_after}");
        Ok(balance_after)
    }
}

#[async_trait]
impl CurrencyCustody for WalletManager {
    async fn withdraw(&self, player: PlayerId, amount: Chips) -> WalletResult<i64> {
        self.transfer(player, amount, EntryDirection::Debit).await
    }

    async fn deposit(&self, player: PlayerId, amount: Chips) -> WalletResult<i64> {
        self.transfer(player, amount, EntryDirection::Credit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_withdraw_and_deposit_update_balance() {
        let wallets = WalletManager::new();
        wallets.open_account(1, 1_000).await;

        assert_eq!(wallets.withdraw(1, 400).await, Ok(600));
        assert_eq!(wallets.deposit(1, 150).await, Ok(750));

        let entries = wallets.get_entries(1).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, EntryDirection::Debit);
        assert_eq!(entries[1].balance_after, 750);
    }

    #[tokio::test]
    async fn test_withdraw_insufficient_balance_leaves_wallet() {
        let wallets = WalletManager::new();
        wallets.open_account(1, 100).await;

        let result = wallets.withdraw(1, 101).await;
        assert_eq!(
            result,
            Err(WalletError::InsufficientBalance {
                available: 100,
                required: 101
            })
        );
        assert_eq!(wallets.balance(1).await, Ok(100));
        assert!(wallets.get_entries(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_wallet_and_zero_amount() {
        let wallets = WalletManager::new();
        assert_eq!(
            wallets.withdraw(9, 10).await,
            Err(WalletError::WalletNotFound(9))
        );
        wallets.open_account(9, 10).await;
        assert_eq!(wallets.deposit(9, 0).await, Err(WalletError::InvalidAmount(0)));
    }

    #[test]
    fn test_client_message_hides_player_id() {
        assert_eq!(
            WalletError::WalletNotFound(42).client_message(),
            "Wallet not found"
        );
    }
}
