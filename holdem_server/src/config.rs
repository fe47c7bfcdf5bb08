//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem::{TableConfig, export::RetryPolicy, table::ConfigError as TableConfigError};
use std::{path::PathBuf, time::Duration};

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Table settings
    pub table: TableConfig,
    /// Bot seats
    pub bots: BotConfig,
    /// Completed hand export; `None` disables it
    pub export_path: Option<PathBuf>,
    /// Export retry behavior
    pub export_retry: RetryPolicy,
    /// Stop after this many hands; `None` runs until interrupted
    pub max_hands: Option<u64>,
}

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Number of bots to seat
    pub count: usize,
    /// Wallet balance each bot starts with
    pub starting_balance: i64,
    /// Buy-in each bot sits down with
    pub buy_in: u32,
    /// Average thinking time before acting
    pub think_time: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bots_override` - Optional bot count override (from CLI args)
    /// * `export_override` - Optional export path override (from CLI args)
    /// * `hands_override` - Optional hand limit override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn from_env(
        bots_override: Option<usize>,
        export_override: Option<PathBuf>,
        hands_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let defaults = TableConfig::default();
        let table = TableConfig {
            name: std::env::var("TABLE_NAME").unwrap_or(defaults.name),
            max_players: parse_env_or("TABLE_MAX_PLAYERS", defaults.max_players),
            small_blind: parse_env_or("TABLE_SMALL_BLIND", defaults.small_blind),
            big_blind: parse_env_or("TABLE_BIG_BLIND", defaults.big_blind),
            min_buy_in: parse_env_or("TABLE_MIN_BUY_IN", defaults.min_buy_in),
            max_buy_in: parse_env_or("TABLE_MAX_BUY_IN", defaults.max_buy_in),
            turn_secs: parse_env_or("TABLE_TURN_SECS", defaults.turn_secs),
            intermission_secs: parse_env_or("TABLE_INTERMISSION_SECS", defaults.intermission_secs),
            rejoin_cooldown_secs: parse_env_or(
                "TABLE_REJOIN_COOLDOWN_SECS",
                defaults.rejoin_cooldown_secs,
            ),
            tick_millis: parse_env_or("TICK_MILLIS", defaults.tick_millis),
            ..defaults
        };

        let bots = BotConfig {
            count: bots_override.unwrap_or_else(|| parse_env_or("BOT_COUNT", 4)),
            starting_balance: parse_env_or("STARTING_BALANCE", 50_000),
            buy_in: parse_env_or("BOT_BUY_IN", table.min_buy_in),
            think_time: Duration::from_millis(parse_env_or("BOT_THINK_MILLIS", 400)),
        };

        let export_path = export_override.or_else(|| {
            std::env::var("EXPORT_PATH")
                .ok()
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
        });

        let export_retry = RetryPolicy {
            max_attempts: match parse_env_or("EXPORT_MAX_ATTEMPTS", 10u32) {
                0 => None,
                n => Some(n),
            },
            ..RetryPolicy::default()
        };

        let max_hands = hands_override.or_else(|| {
            std::env::var("MAX_HANDS")
                .ok()
                .and_then(|v| v.parse().ok())
        });

        let config = ServerConfig {
            table,
            bots,
            export_path,
            export_retry,
            max_hands,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;

        if self.bots.count > self.table.max_players {
            return Err(ConfigError::Invalid {
                var: "BOT_COUNT".to_string(),
                reason: format!("Cannot exceed max players ({})", self.table.max_players),
            });
        }

        if !self.table.accepts_buy_in(self.bots.buy_in) {
            return Err(ConfigError::Invalid {
                var: "BOT_BUY_IN".to_string(),
                reason: format!(
                    "Must be between {} and {}",
                    self.table.min_buy_in, self.table.max_buy_in
                ),
            });
        }

        if self.bots.starting_balance < i64::from(self.bots.buy_in) {
            return Err(ConfigError::Invalid {
                var: "STARTING_BALANCE".to_string(),
                reason: format!("Must cover the bot buy-in ({})", self.bots.buy_in),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid table configuration: {0}")]
    Table(#[from] TableConfigError),

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
