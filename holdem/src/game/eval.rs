//! Hand strength evaluation.
//!
//! The table only depends on the [`HandEvaluator`] trait: given two to seven
//! cards it wants a totally ordered strength plus a description to show the
//! players. [`StandardEvaluator`] is the default implementation.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

use super::entities::{ACE, Card, Value, value_name};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
        };
        write!(f, "{repr}")
    }
}

/// Comparable strength of a hand. Ranks compare first, then the tie
/// breaking values from most to least significant.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandStrength {
    pub rank: Rank,
    pub values: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandRanking {
    pub strength: HandStrength,
    pub description: String,
}

impl PartialOrd for HandRanking {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRanking {
    fn cmp(&self, other: &Self) -> Ordering {
        self.strength.cmp(&other.strength)
    }
}

impl fmt::Display for HandRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

pub trait HandEvaluator: Send + Sync {
    /// Ranks two to seven cards.
    fn rank(&self, cards: &[Card]) -> HandRanking;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl HandEvaluator for StandardEvaluator {
    /// # Panics
    ///
    /// Panics when given fewer than two or more than seven cards.
    fn rank(&self, cards: &[Card]) -> HandRanking {
        assert!(
            (2..=7).contains(&cards.len()),
            "hand evaluation needs 2 to 7 cards, got {}",
            cards.len()
        );
        let strength = if cards.len() <= 5 {
            strength_of(cards)
        } else {
            best_five(cards)
        };
        let description = describe(&strength);
        HandRanking {
            strength,
            description,
        }
    }
}

fn best_five(cards: &[Card]) -> HandStrength {
    let n = cards.len();
    let mut best: Option<HandStrength> = None;
    let mut subset = Vec::with_capacity(5);
    for mask in 0u32..(1 << n) {
        if mask.count_ones() != 5 {
            continue;
        }
        subset.clear();
        subset.extend((0..n).filter(|i| mask & (1 << i) != 0).map(|i| cards[i]));
        let strength = strength_of(&subset);
        if best.as_ref().is_none_or(|b| strength > *b) {
            best = Some(strength);
        }
    }
    best.unwrap_or_else(|| strength_of(&cards[..5]))
}

/// Strength of up to five cards. Straights and flushes need all five.
fn strength_of(cards: &[Card]) -> HandStrength {
    let mut counts = [0u8; ACE as usize + 1];
    for card in cards {
        counts[card.0 as usize] += 1;
    }
    // (count, value) pairs, most copies first then highest value.
    let mut groups: Vec<(u8, Value)> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(value, &count)| (count, value as Value))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let values: Vec<Value> = groups.iter().map(|&(_, value)| value).collect();

    if cards.len() == 5 {
        let is_flush = cards.iter().all(|card| card.1 == cards[0].1);
        let straight_high = straight_high(&values);
        match (is_flush, straight_high) {
            (true, Some(high)) => {
                return HandStrength {
                    rank: Rank::StraightFlush,
                    values: vec![high],
                };
            }
            (true, None) => {
                return HandStrength {
                    rank: Rank::Flush,
                    values,
                };
            }
            (false, Some(high)) => {
                return HandStrength {
                    rank: Rank::Straight,
                    values: vec![high],
                };
            }
            (false, None) => {}
        }
    }

    let rank = match (groups[0].0, groups.get(1).map(|g| g.0)) {
        (4, _) => Rank::FourOfAKind,
        (3, Some(2)) => Rank::FullHouse,
        (3, _) => Rank::ThreeOfAKind,
        (2, Some(2)) => Rank::TwoPair,
        (2, _) => Rank::OnePair,
        _ => Rank::HighCard,
    };
    HandStrength { rank, values }
}

/// High card of a five card straight, treating the wheel as five high.
/// `values` must be sorted descending.
fn straight_high(values: &[Value]) -> Option<Value> {
    if values.len() != 5 {
        return None;
    }
    if values[0] - values[4] == 4 {
        return Some(values[0]);
    }
    if values == [ACE, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

fn plural(value: Value) -> String {
    match value {
        6 => "Sixes".to_string(),
        v => format!("{}s", value_name(v)),
    }
}

fn describe(strength: &HandStrength) -> String {
    let v = &strength.values;
    match strength.rank {
        Rank::HighCard => format!("high card {}", value_name(v[0])),
        Rank::OnePair => format!("a pair of {}", plural(v[0])),
        Rank::TwoPair => format!("two pair, {} and {}", plural(v[0]), plural(v[1])),
        Rank::ThreeOfAKind => format!("three {}", plural(v[0])),
        Rank::Straight => format!("a straight, {} high", value_name(v[0])),
        Rank::Flush => format!("a flush, {} high", value_name(v[0])),
        Rank::FullHouse => format!("a full house, {} full of {}", plural(v[0]), plural(v[1])),
        Rank::FourOfAKind => format!("four {}", plural(v[0])),
        Rank::StraightFlush if v[0] == ACE => "a royal flush".to_string(),
        Rank::StraightFlush => format!("a straight flush, {} high", value_name(v[0])),
    }
}
