use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];

    /// Single lowercase letter used in exported hand records.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Club => 'c',
            Self::Diamond => 'd',
            Self::Heart => 'h',
            Self::Spade => 's',
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Club => "Clubs",
            Self::Diamond => "Diamonds",
            Self::Heart => "Hearts",
            Self::Spade => "Spades",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuces are 2, aces are 14.
pub type Value = u8;

pub const LOWEST_VALUE: Value = 2;
pub const ACE: Value = 14;

/// Letter used for a card value in short codes ("T" for ten).
#[must_use]
pub const fn value_letter(value: Value) -> char {
    match value {
        2 => '2',
        3 => '3',
        4 => '4',
        5 => '5',
        6 => '6',
        7 => '7',
        8 => '8',
        9 => '9',
        10 => 'T',
        11 => 'J',
        12 => 'Q',
        13 => 'K',
        _ => 'A',
    }
}

/// Spelled out value name, e.g. "Seven" or "Queen".
#[must_use]
pub const fn value_name(value: Value) -> &'static str {
    match value {
        2 => "Two",
        3 => "Three",
        4 => "Four",
        5 => "Five",
        6 => "Six",
        7 => "Seven",
        8 => "Eight",
        9 => "Nine",
        10 => "Ten",
        11 => "Jack",
        12 => "Queen",
        13 => "King",
        _ => "Ace",
    }
}

/// A card is a tuple of a value (deuce=2u8 ... ace=14u8) and a suit.
/// Cards compare by value first and suit second.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    #[must_use]
    pub const fn value(&self) -> Value {
        self.0
    }

    #[must_use]
    pub const fn suit(&self) -> Suit {
        self.1
    }

    /// Two letter code such as "Th" or "As".
    #[must_use]
    pub fn short_code(&self) -> String {
        format!("{}{}", value_letter(self.0), self.1.letter())
    }

    /// Human readable name such as "Ten of Hearts".
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} of {}", value_name(self.0), self.1.name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            11 => "J",
            12 => "Q",
            13 => "K",
            14 => "A",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// Joins cards into space separated short codes ("Ah Kd 7c").
#[must_use]
pub fn short_codes(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::short_code)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Type alias for whole chips. All bets, stacks and pot contributions are
/// whole chips.
pub type Chips = u32;

/// Stable identifier the host assigns to a seated participant.
pub type PlayerId = i64;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        username.truncate(constants::MAX_USER_INPUT_LENGTH / 2);
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The kind of an action, without its amount. This is what the round's
/// action log records.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ActionKind {
    Bet,
    Raise,
    Call,
    Check,
    Fold,
    AllIn,
}

impl ActionKind {
    /// Numeric id used in exported action records.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Bet => 0,
            Self::Raise => 1,
            Self::Call => 2,
            Self::Check => 3,
            Self::Fold => 4,
            Self::AllIn => 5,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Bet => "bet",
            Self::Raise => "raise",
            Self::Call => "call",
            Self::Check => "check",
            Self::Fold => "fold",
            Self::AllIn => "all-in",
        };
        write!(f, "{repr}")
    }
}

/// An action a player submits on their turn.
///
/// `Bet` is the total opening bet for the round, `Raise` is the amount
/// added on top of the current call.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerAction {
    Bet(Chips),
    Raise(Chips),
    Call,
    Check,
    Fold,
    AllIn,
}

impl PlayerAction {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Bet(_) => ActionKind::Bet,
            Self::Raise(_) => ActionKind::Raise,
            Self::Call => ActionKind::Call,
            Self::Check => ActionKind::Check,
            Self::Fold => ActionKind::Fold,
            Self::AllIn => ActionKind::AllIn,
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Bet(amount) => format!("bets {amount}"),
            Self::Raise(amount) => format!("raises {amount}"),
            Self::Call => "calls".to_string(),
            Self::Check => "checks".to_string(),
            Self::Fold => "folds".to_string(),
            Self::AllIn => "goes all-in".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// A choice offered to the player whose turn it is. Amounts are hints
/// for the presentation layer: the call owed, the suggested minimum bet or
/// raise, and the stack that an all-in would commit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionChoice {
    Check,
    Call(Chips),
    Bet(Chips),
    Raise(Chips),
    AllIn(Chips),
    Fold,
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "check".to_string(),
            Self::Call(amount) => format!("call (== {amount})"),
            Self::Bet(amount) => format!("bet (>= {amount})"),
            Self::Raise(amount) => format!("raise (>= {amount})"),
            Self::AllIn(amount) => format!("all-in ({amount})"),
            Self::Fold => "fold".to_string(),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ActionChoices(pub Vec<ActionChoice>);

impl ActionChoices {
    /// Whether the choices include the variant of `choice`, ignoring amounts.
    #[must_use]
    pub fn allows(&self, kind: ActionKind) -> bool {
        self.0.iter().any(|choice| {
            matches!(
                (choice, kind),
                (ActionChoice::Check, ActionKind::Check)
                    | (ActionChoice::Call(_), ActionKind::Call)
                    | (ActionChoice::Bet(_), ActionKind::Bet)
                    | (ActionChoice::Raise(_), ActionKind::Raise)
                    | (ActionChoice::AllIn(_), ActionKind::AllIn)
                    | (ActionChoice::Fold, ActionKind::Fold)
            )
        })
    }
}

impl fmt::Display for ActionChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_options = self.0.len();
        let repr = self
            .0
            .iter()
            .enumerate()
            .map(|(i, action_choice)| {
                let repr = action_choice.to_string();
                match i {
                    0 if num_options == 1 => repr,
                    0 if num_options == 2 => format!("{repr} "),
                    0 if num_options >= 3 => format!("{repr}, "),
                    i if i == num_options - 1 && num_options != 1 => format!("or {repr}"),
                    _ => format!("{repr}, "),
                }
            })
            .collect::<String>();
        write!(f, "{repr}")
    }
}
