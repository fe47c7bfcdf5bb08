//! Pot and side-pot engine.
//!
//! All chips committed during a hand go into the first pot. After the hand
//! is fully revealed the pot is split into tiers, one per distinct all-in
//! level, so a short stack can only win what it matched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{
    entities::{Chips, PlayerId},
    eval::HandStrength,
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    contributions: BTreeMap<PlayerId, Chips>,
}

/// Outcome of awarding one pot.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PotAward {
    pub winners: Vec<PlayerId>,
    /// Chips each winner receives from the losing stakes.
    pub share: Chips,
    /// Each losing contributor and the stake they lose.
    pub losses: Vec<(PlayerId, Chips)>,
    /// Each winner and their own stake, handed back in full.
    pub returned: Vec<(PlayerId, Chips)>,
    /// Chips lost to integer division of the losing stakes.
    pub remainder: Chips,
}

impl Pot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, player: PlayerId, amount: Chips) {
        if amount == 0 {
            return;
        }
        *self.contributions.entry(player).or_default() += amount;
    }

    #[must_use]
    pub fn contribution(&self, player: PlayerId) -> Chips {
        self.contributions.get(&player).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn contributions(&self) -> &BTreeMap<PlayerId, Chips> {
        &self.contributions
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.contributions.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Caps every contribution at the smallest one and moves the excess of
    /// each non-folded contributor into a new pot. Folded contributors'
    /// excess stays here. Returns `None` when nothing was moved.
    pub fn split<F>(&mut self, is_folded: F) -> Option<Self>
    where
        F: Fn(PlayerId) -> bool,
    {
        let min = self.contributions.values().copied().min()?;
        let mut side = Self::new();
        for (&player, amount) in &mut self.contributions {
            if *amount > min && !is_folded(player) {
                side.add(player, *amount - min);
                *amount = min;
            }
        }
        if side.is_empty() { None } else { Some(side) }
    }

    /// Splits repeatedly until every tier is capped, returning this pot
    /// followed by its side pots.
    #[must_use]
    pub fn into_tiers<F>(self, is_folded: F) -> Vec<Self>
    where
        F: Fn(PlayerId) -> bool,
    {
        let mut tiers = vec![self];
        while let Some(last) = tiers.last_mut()
            && let Some(side) = last.split(&is_folded)
        {
            tiers.push(side);
        }
        tiers
    }

    /// Decides who wins this pot. `standings` holds the hand strength of
    /// every non-folded player still in the hand; contributors missing from
    /// it cannot win.
    ///
    /// # Panics
    ///
    /// Panics when no contributor appears in `standings`. Every pot is
    /// built from chips of at least one live player, so this means the
    /// table lost track of who is still in the hand.
    #[must_use]
    pub fn award(&self, standings: &HashMap<PlayerId, HandStrength>) -> PotAward {
        let best = self
            .contributions
            .keys()
            .filter_map(|player| standings.get(player))
            .max();
        let Some(best) = best else {
            panic!(
                "no eligible contributor for pot of {} chips from {:?}",
                self.total(),
                self.contributions.keys().collect::<Vec<_>>()
            );
        };

        let mut award = PotAward::default();
        let mut total_lost: Chips = 0;
        for (&player, &amount) in &self.contributions {
            if standings.get(&player) == Some(best) {
                award.winners.push(player);
                award.returned.push((player, amount));
            } else {
                award.losses.push((player, amount));
                total_lost += amount;
            }
        }
        let num_winners = Chips::try_from(award.winners.len()).unwrap_or(Chips::MAX);
        award.share = total_lost / num_winners;
        award.remainder = total_lost % num_winners;
        award
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::eval::Rank;

    fn strength(rank: Rank, high: u8) -> HandStrength {
        HandStrength {
            rank,
            values: vec![high],
        }
    }

    #[test]
    fn test_add_skips_zero() {
        let mut pot = Pot::new();
        pot.add(1, 0);
        assert!(pot.is_empty());
        pot.add(1, 10);
        pot.add(1, 5);
        assert_eq!(pot.contribution(1), 15);
    }

    #[test]
    fn test_split_short_all_in() {
        let mut pot = Pot::new();
        pot.add(1, 100);
        pot.add(2, 100);
        pot.add(3, 50);
        let side = pot.split(|_| false).unwrap();
        assert_eq!(pot.total(), 150);
        assert_eq!(pot.contribution(3), 50);
        assert_eq!(side.total(), 100);
        assert_eq!(side.contribution(3), 0);
        assert_eq!(side.contributions().len(), 2);
    }

    #[test]
    fn test_split_keeps_folded_excess() {
        let mut pot = Pot::new();
        pot.add(1, 100);
        pot.add(2, 80);
        pot.add(3, 20);
        let side = pot.split(|player| player == 2).unwrap();
        assert_eq!(pot.contribution(2), 80);
        assert_eq!(pot.contribution(1), 20);
        assert_eq!(side.contribution(1), 80);
        assert_eq!(side.contributions().len(), 1);
    }

    #[test]
    fn test_split_equal_contributions_is_noop() {
        let mut pot = Pot::new();
        pot.add(1, 40);
        pot.add(2, 40);
        assert_eq!(pot.split(|_| false), None);
    }

    #[test]
    fn test_into_tiers_multiple_all_ins() {
        let mut pot = Pot::new();
        pot.add(1, 300);
        pot.add(2, 200);
        pot.add(3, 100);
        pot.add(4, 300);
        let total = pot.total();
        let tiers = pot.into_tiers(|_| false);
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].total(), 400);
        assert_eq!(tiers[1].total(), 300);
        assert_eq!(tiers[2].total(), 200);
        assert_eq!(tiers.iter().map(Pot::total).sum::<Chips>(), total);
    }

    #[test]
    fn test_award_split_between_equal_winners() {
        let mut pot = Pot::new();
        pot.add(1, 100);
        pot.add(2, 100);
        pot.add(3, 100);
        let standings = HashMap::from([
            (1, strength(Rank::Straight, 9)),
            (2, strength(Rank::Straight, 9)),
            (3, strength(Rank::OnePair, 4)),
        ]);
        let award = pot.award(&standings);
        assert_eq!(award.winners, vec![1, 2]);
        assert_eq!(award.share, 50);
        assert_eq!(award.returned, vec![(1, 100), (2, 100)]);
        assert_eq!(award.losses, vec![(3, 100)]);
        assert_eq!(award.remainder, 0);
    }

    #[test]
    fn test_award_drops_odd_chip() {
        let mut pot = Pot::new();
        pot.add(1, 100);
        pot.add(2, 100);
        pot.add(3, 101);
        let standings = HashMap::from([
            (1, strength(Rank::Flush, 12)),
            (2, strength(Rank::Flush, 12)),
        ]);
        let award = pot.award(&standings);
        assert_eq!(award.share, 50);
        assert_eq!(award.remainder, 1);
    }

    #[test]
    fn test_award_folded_contributor_loses() {
        let mut pot = Pot::new();
        pot.add(1, 20);
        pot.add(2, 40);
        let standings = HashMap::from([(2, strength(Rank::HighCard, 9))]);
        let award = pot.award(&standings);
        assert_eq!(award.winners, vec![2]);
        assert_eq!(award.share, 20);
        assert_eq!(award.losses, vec![(1, 20)]);
    }

    #[test]
    #[should_panic(expected = "no eligible contributor")]
    fn test_award_without_eligible_contributor_panics() {
        let mut pot = Pot::new();
        pot.add(1, 20);
        let _ = pot.award(&HashMap::new());
    }
}
