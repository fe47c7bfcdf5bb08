//! Validation errors returned to players.
//!
//! Each message is what the player sees. None of these mutate table state;
//! the player may correct the request and try again.

use thiserror::Error;

use super::entities::Chips;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ActionError {
    #[error("You are not seated at this table.")]
    NotSeated,

    #[error("A bet has already been made this round. Raise instead.")]
    BetAlreadyPlaced,

    #[error("You must bet at least {minimum}.")]
    BetTooSmall { minimum: Chips },

    #[error("You do not have enough chips to bet that much ({stack} available).")]
    InsufficientChips { stack: Chips },

    #[error("There is no bet to raise this round.")]
    NoBetToRaise,

    #[error("You must raise by at least {minimum}.")]
    RaiseTooSmall { minimum: Chips },

    #[error("You do not have enough to raise by that much.")]
    RaiseTooLarge,

    #[error("You cannot check while facing a bet of {call}.")]
    CannotCheck { call: Chips },

    #[error("The amount must be greater than zero.")]
    InvalidAmount,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum JoinError {
    #[error("Another player from your address is already seated at this table.")]
    DuplicateAddress,

    #[error("You cannot join another poker game for {seconds} seconds.")]
    Cooldown { seconds: i64 },

    #[error("You cannot join poker while you are in combat!")]
    InCombat,

    #[error("You cannot join a poker game while in a party.")]
    InGroup,

    #[error("I am too far away to do that")]
    TooFar,

    #[error("You are already seated at this table")]
    AlreadySeated,

    #[error("Sorry, that table is full")]
    TableFull,

    #[error("The buy-in must be between {min} and {max} chips.")]
    BuyInOutOfRange { min: Chips, max: Chips },

    #[error("Your bank box lacks the funds to join this poker table.")]
    InsufficientFunds,
}
