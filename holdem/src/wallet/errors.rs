//! Custody errors.

use thiserror::Error;

use crate::game::entities::PlayerId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Bank box holds {available}, but {required} is needed")]
    InsufficientBalance { available: i64, required: i64 },

    #[error("No bank box for player {0}")]
    WalletNotFound(PlayerId),

    /// Transfers must move a positive amount.
    #[error("Cannot transfer {0} chips")]
    InvalidAmount(i64),

    /// The custody service could not be reached or refused the transfer.
    #[error("Custody transfer failed: {0}")]
    TransactionFailed(String),
}

impl WalletError {
    /// Message safe to show a player: no ids, no backend details.
    pub fn client_message(&self) -> String {
        match self {
            Self::WalletNotFound(_) => "Wallet not found".to_string(),
            Self::TransactionFailed(_) => "The bank is unavailable, try again later".to_string(),
            Self::InsufficientBalance { .. } | Self::InvalidAmount(_) => self.to_string(),
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
