//! Card supply for a single table.

use rand::Rng;

use super::{
    constants::{DECK_SIZE, SHUFFLE_PASSES},
    entities::{ACE, Card, LOWEST_VALUE, Suit},
};

/// A 52-card deck with a used pile. The top of the deck is the last
/// element of `remaining`.
#[derive(Clone, Debug)]
pub struct Deck {
    remaining: Vec<Card>,
    used: Vec<Card>,
}

impl Deck {
    /// Every (value, suit) combination exactly once, in a fixed order.
    #[must_use]
    pub fn build() -> Vec<Card> {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for value in LOWEST_VALUE..=ACE {
                cards.push(Card(value, suit));
            }
        }
        cards
    }

    /// An unshuffled deck. Mostly useful for deterministic tests.
    #[must_use]
    pub fn unshuffled() -> Self {
        Self {
            remaining: Self::build(),
            used: Vec::with_capacity(DECK_SIZE),
        }
    }

    /// A deck shuffled with the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(&mut rand::rng())
    }

    /// A deck shuffled with the given generator.
    pub fn with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut deck = Self::unshuffled();
        deck.shuffle_with(SHUFFLE_PASSES, rng);
        deck
    }

    pub fn shuffle(&mut self, passes: usize) {
        self.shuffle_with(passes, &mut rand::rng());
    }

    /// Repeated swap shuffle: every pass visits each position once and
    /// swaps it with a uniformly random position of the whole deck.
    pub fn shuffle_with<R: Rng>(&mut self, passes: usize, rng: &mut R) {
        let len = self.remaining.len();
        if len < 2 {
            return;
        }
        for _ in 0..passes {
            for j in 0..len {
                let k = rng.random_range(0..len);
                self.remaining.swap(j, k);
            }
        }
    }

    /// Removes the top card and moves it to the used pile.
    ///
    /// # Panics
    ///
    /// Panics when the deck is exhausted. A single hand never needs more
    /// than 52 cards, so this indicates a broken table invariant.
    pub fn draw(&mut self) -> Card {
        let Some(card) = self.remaining.pop() else {
            panic!("drew from an exhausted deck ({} cards used)", self.used.len());
        };
        self.used.push(card);
        card
    }

    #[must_use]
    pub fn peek(&self) -> Option<Card> {
        self.remaining.last().copied()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    #[must_use]
    pub fn used(&self) -> &[Card] {
        &self.used
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
