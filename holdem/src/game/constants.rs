//! Fixed table timings and limits.

/// Number of distinct cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Number of repeated shuffle passes applied to a freshly built deck.
pub const SHUFFLE_PASSES: usize = 5;

/// Hole cards dealt to every player in the hand.
pub const HOLE_CARDS: usize = 2;

/// Seconds a player has to act before being folded.
pub const DEFAULT_TURN_SECS: u32 = 60;

/// Seconds between the end of one hand and the start of the next.
pub const DEFAULT_INTERMISSION_SECS: u32 = 20;

/// Seconds a player must wait before sitting down again after leaving.
pub const DEFAULT_REJOIN_COOLDOWN_SECS: i64 = 60;

/// Seconds after combat during which a player may not sit down.
pub const DEFAULT_COMBAT_LOCKOUT_SECS: i64 = 60;

/// Maximum distance from the table a player may join from.
pub const DEFAULT_JOIN_RANGE: u32 = 8;

/// Most players a 52-card deck can serve (two hole cards each plus a
/// five card board).
pub const MAX_PLAYERS: usize = 23;

pub const MAX_USER_INPUT_LENGTH: usize = 64;
