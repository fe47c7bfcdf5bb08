//! Hand lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the orchestrator does while in a state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum StateCategory {
    /// Cards are revealed automatically on the next tick.
    Dealing,
    /// Players act in turn until the round closes.
    Betting,
    /// No dealing or betting happens.
    Terminal,
}

/// States of one hand, in the order they are visited. A hand never
/// moves backwards.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandState {
    #[default]
    Inactive,
    DealHoleCards,
    PreflopBetting,
    Flop,
    FlopBetting,
    Turn,
    TurnBetting,
    River,
    RiverBetting,
    Showdown,
    DetermineWinners,
    Intermission,
}

impl HandState {
    #[must_use]
    pub const fn category(self) -> StateCategory {
        match self {
            Self::DealHoleCards | Self::Flop | Self::Turn | Self::River => StateCategory::Dealing,
            Self::PreflopBetting | Self::FlopBetting | Self::TurnBetting | Self::RiverBetting => {
                StateCategory::Betting
            }
            Self::Showdown | Self::DetermineWinners | Self::Intermission | Self::Inactive => {
                StateCategory::Terminal
            }
        }
    }

    /// The following state. Intermission wraps back to Inactive.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Inactive => Self::DealHoleCards,
            Self::DealHoleCards => Self::PreflopBetting,
            Self::PreflopBetting => Self::Flop,
            Self::Flop => Self::FlopBetting,
            Self::FlopBetting => Self::Turn,
            Self::Turn => Self::TurnBetting,
            Self::TurnBetting => Self::River,
            Self::River => Self::RiverBetting,
            Self::RiverBetting => Self::Showdown,
            Self::Showdown => Self::DetermineWinners,
            Self::DetermineWinners => Self::Intermission,
            Self::Intermission => Self::Inactive,
        }
    }

    /// Numeric position of the state, used in exported action records.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_betting(self) -> bool {
        matches!(self.category(), StateCategory::Betting)
    }

    #[must_use]
    pub const fn is_dealing(self) -> bool {
        matches!(self.category(), StateCategory::Dealing)
    }

    /// Whether a hand is being played, from dealing the hole cards up to
    /// (not including) the showdown.
    #[must_use]
    pub fn is_in_hand(self) -> bool {
        self > Self::Inactive && self < Self::Showdown
    }

    /// Community cards revealed when entering this dealing state.
    #[must_use]
    pub const fn community_cards(self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for HandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Inactive => "inactive",
            Self::DealHoleCards => "deal hole cards",
            Self::PreflopBetting => "preflop betting",
            Self::Flop => "flop",
            Self::FlopBetting => "flop betting",
            Self::Turn => "turn",
            Self::TurnBetting => "turn betting",
            Self::River => "river",
            Self::RiverBetting => "river betting",
            Self::Showdown => "showdown",
            Self::DetermineWinners => "determine winners",
            Self::Intermission => "intermission",
        };
        write!(f, "{repr}")
    }
}
