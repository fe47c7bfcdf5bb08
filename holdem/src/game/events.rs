use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entities::{ActionChoices, Chips, PlayerId};

/// Notifications produced by the table, drained by whoever drives it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TableEvent {
    /// Spoken by the dealer to everyone at the table.
    Announcement(String),
    /// A player's public message, usually describing their action.
    Said { player: PlayerId, text: String },
    /// A private message for one player.
    Direct { player: PlayerId, text: String },
    /// It is `player`'s turn; they have `seconds` to pick from `choices`.
    TurnStarted {
        player: PlayerId,
        choices: ActionChoices,
        seconds: u32,
    },
    HandStarted { hand_id: Uuid },
    HandFinished { hand_id: Uuid, pot: Chips },
    PlayerJoined { player: PlayerId },
    PlayerLeft { player: PlayerId },
}

impl TableEvent {
    /// The only player allowed to see this event, if it is private.
    #[must_use]
    pub fn recipient(&self) -> Option<PlayerId> {
        match self {
            Self::Direct { player, .. } => Some(*player),
            _ => None,
        }
    }
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Announcement(text) => write!(f, "[dealer]: {text}"),
            Self::Said { player, text } => write!(f, "[{player}]: {text}"),
            Self::Direct { player, text } => write!(f, "(to {player}) {text}"),
            Self::TurnStarted {
                player,
                choices,
                seconds,
            } => write!(f, "{player}'s turn ({seconds}s): {choices}"),
            Self::HandStarted { hand_id } => write!(f, "hand {hand_id} started"),
            Self::HandFinished { hand_id, pot } => {
                write!(f, "hand {hand_id} finished with a pot of {pot}")
            }
            Self::PlayerJoined { player } => write!(f, "{player} joined"),
            Self::PlayerLeft { player } => write!(f, "{player} left"),
        }
    }
}
