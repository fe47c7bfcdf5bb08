//! Exported hand records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::entities::{Chips, PlayerId};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandRecord {
    pub hand_id: Uuid,
    pub table: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub final_pot: Chips,
    /// Space separated short codes, e.g. "Ah Kd 7c 2s 9h".
    pub community_cards: String,
}

/// One action taken during the hand, in the order it happened.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionRecord {
    pub hand_id: Uuid,
    pub player_id: PlayerId,
    /// Numeric position of the hand state the action happened in.
    pub state: u8,
    /// Numeric action kind.
    pub action: u8,
    /// Chips actually committed by the action.
    pub amount: Chips,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerResult {
    pub hand_id: Uuid,
    pub player_id: PlayerId,
    /// Net result: positive for winnings, negative for lost stakes.
    pub won: i64,
    pub starting_stack: Chips,
    pub folded: bool,
    pub hole_cards: String,
    pub hand: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CompletedHand {
    pub hand: HandRecord,
    pub actions: Vec<ActionRecord>,
    pub players: Vec<PlayerResult>,
}

impl CompletedHand {
    #[must_use]
    pub fn hand_id(&self) -> Uuid {
        self.hand.hand_id
    }
}
