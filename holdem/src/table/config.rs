//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::game::{
    constants::{
        DEFAULT_COMBAT_LOCKOUT_SECS, DEFAULT_INTERMISSION_SECS, DEFAULT_JOIN_RANGE,
        DEFAULT_REJOIN_COOLDOWN_SECS, DEFAULT_TURN_SECS, MAX_PLAYERS,
    },
    entities::Chips,
};

/// Table configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Big blind must be greater than small blind")]
    BlindOrder,

    #[error("Max buy-in must be greater than min buy-in")]
    BuyInOrder,

    #[error("Min buy-in must cover at least the big blind")]
    BuyInBelowBigBlind,

    #[error("Max players must be between 2 and {MAX_PLAYERS}")]
    PlayerCount,

    #[error("Turn length and tick period must be positive")]
    ZeroDuration,
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Maximum number of seated players
    pub max_players: usize,

    pub small_blind: Chips,
    pub big_blind: Chips,

    /// Buy-in bounds in chips, also applied to rebuys
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,

    /// Seconds a player has to act
    pub turn_secs: u32,

    /// Seconds between hands
    pub intermission_secs: u32,

    pub rejoin_cooldown_secs: i64,
    pub combat_lockout_secs: i64,

    /// Maximum distance a player may join from
    pub join_range: u32,

    /// Seconds left on a turn at which the player is warned
    pub turn_warnings: Vec<u32>,

    /// Seconds left in intermission at which the next hand is announced
    pub intermission_announcements: Vec<u32>,

    /// Period of the table clock in milliseconds. One tick is one second of
    /// table time.
    pub tick_millis: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            max_players: 10,
            small_blind: 50,
            big_blind: 100,
            min_buy_in: 2_000,
            max_buy_in: 10_000,
            turn_secs: DEFAULT_TURN_SECS,
            intermission_secs: DEFAULT_INTERMISSION_SECS,
            rejoin_cooldown_secs: DEFAULT_REJOIN_COOLDOWN_SECS,
            combat_lockout_secs: DEFAULT_COMBAT_LOCKOUT_SECS,
            join_range: DEFAULT_JOIN_RANGE,
            turn_warnings: vec![30, 15, 5],
            intermission_announcements: vec![20, 10, 5],
            tick_millis: 1_000,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.big_blind <= self.small_blind {
            return Err(ConfigError::BlindOrder);
        }

        if self.max_buy_in <= self.min_buy_in {
            return Err(ConfigError::BuyInOrder);
        }

        if self.min_buy_in < self.big_blind {
            return Err(ConfigError::BuyInBelowBigBlind);
        }

        if !(2..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(ConfigError::PlayerCount);
        }

        if self.turn_secs == 0 || self.tick_millis == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        Ok(())
    }

    /// Whether `buy_in` is inside the table's buy-in bounds
    pub fn accepts_buy_in(&self, buy_in: Chips) -> bool {
        (self.min_buy_in..=self.max_buy_in).contains(&buy_in)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
