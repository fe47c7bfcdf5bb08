//! Read-only snapshots of a table for the presentation layer.

use serde::{Deserialize, Serialize};

use super::{
    entities::{Card, Chips, PlayerId, Username},
    positions::BlindPositions,
    states::HandState,
};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: Username,
    pub stack: Chips,
    pub round_contribution: Chips,
    pub has_folded: bool,
    pub has_acted: bool,
    pub is_all_in: bool,
    pub in_hand: bool,
    /// `None` when the viewer is not allowed to see them.
    pub hole_cards: Option<Vec<Card>>,
    pub hand_description: Option<String>,
    /// Seconds left, only set for the player whose turn it is.
    pub turn_remaining: Option<u32>,
    pub leaving: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableView {
    pub name: String,
    pub state: HandState,
    pub board: Vec<Card>,
    pub pots: Vec<Chips>,
    pub positions: BlindPositions,
    pub current_turn: Option<PlayerId>,
    pub min_bet: Chips,
    pub min_raise: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub intermission_remaining: Option<u32>,
    pub players: Vec<PlayerView>,
    pub viewers: usize,
}

impl TableView {
    #[must_use]
    pub fn pot_total(&self) -> Chips {
        self.pots.iter().sum()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }
}
