//! Poker game engine - hand lifecycle and game logic.
//!
//! This module provides the single-table Texas Hold'em engine:
//! - Cards, the deck and hand evaluation
//! - Blind positions, betting rounds and side pots
//! - Admission rules, leaving and rebuys
//! - Events and per-viewer table views

pub mod admission;
pub mod constants;
pub mod deck;
pub mod entities;
pub mod errors;
pub mod eval;
pub mod events;
pub mod player;
pub mod positions;
pub mod pot;
pub mod states;
pub mod table;
pub mod view;

pub use admission::JoinRequest;
pub use errors::{ActionError, JoinError};
pub use eval::{HandEvaluator, HandRanking, StandardEvaluator};
pub use events::TableEvent;
pub use states::HandState;
pub use table::{Departure, PokerTable};
pub use view::{PlayerView, TableView};
