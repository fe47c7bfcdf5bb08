//! # Holdem
//!
//! A tick-driven Texas Hold'em engine for a single table.
//!
//! The table advances one second at a time. Every tick moves the hand
//! through its states, runs the turn clock and counts down the pause
//! between hands:
//!
//! - **Inactive**: Waiting for enough funded players
//! - **DealHoleCards**: Posting blinds and dealing two cards each
//! - **Flop/Turn/River**: Revealing community cards, each followed by a
//!   betting round
//! - **Showdown/DetermineWinners**: Building side pots and paying winners
//! - **Intermission**: Countdown to the next hand
//!
//! ## Core Modules
//!
//! - [`game`]: Hand lifecycle, entities, pots and hand evaluation
//! - [`table`]: Async actor serializing ticks and player requests
//! - [`wallet`]: Currency custody for buy-ins and payouts
//! - [`export`]: Records of completed hands and their delivery
//!
//! ## Example
//!
//! ```
//! use holdem::{PokerTable, TableConfig};
//!
//! let table = PokerTable::new(TableConfig::default());
//! assert!(table.is_empty());
//! ```

/// Hand export records, sinks and the retrying queue.
pub mod export;

/// Core game logic, entities, and the hand lifecycle.
pub mod game;
pub use game::{
    ActionError, HandState, JoinError, JoinRequest, PokerTable, TableEvent, TableView,
    constants::{self, MAX_PLAYERS},
    entities::{self, Card, Chips, PlayerAction, PlayerId, Username},
};

/// Table actor and configuration.
pub mod table;
pub use table::{TableActor, TableConfig, TableHandle, TableNotification, TableResponse};

/// Currency custody.
pub mod wallet;
pub use wallet::{CurrencyCustody, WalletManager};
