//! Bank boxes and their ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::entities::PlayerId;

/// A player's currency held outside the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub player_id: PlayerId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One transfer between a bank box and the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    /// Position in the ledger, starting at 1.
    pub id: i64,
    pub player_id: PlayerId,
    pub amount: i64,
    pub balance_after: i64,
    pub direction: EntryDirection,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    /// Buy-in or rebuy carried to the table.
    Debit,
    /// Stack paid back when leaving.
    Credit,
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        })
    }
}
