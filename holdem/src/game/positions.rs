//! Dealer button and blind rotation.

use serde::{Deserialize, Serialize};

use super::entities::PlayerId;

/// Circular scan for the next eligible player after `from`.
///
/// The scan starts at the beginning of `order` when `from` is `None` or no
/// longer present. Returns `None` when no player other than `from` is
/// eligible.
pub fn next_eligible<F>(order: &[PlayerId], from: Option<PlayerId>, is_eligible: F) -> Option<PlayerId>
where
    F: Fn(PlayerId) -> bool,
{
    let start = from.and_then(|id| order.iter().position(|&p| p == id));
    let len = order.len();
    match start {
        Some(idx) => (1..len)
            .map(|offset| order[(idx + offset) % len])
            .find(|&p| is_eligible(p)),
        None => order.iter().copied().find(|&p| is_eligible(p)),
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlindPositions {
    pub dealer_button: Option<PlayerId>,
    pub small_blind: Option<PlayerId>,
    pub big_blind: Option<PlayerId>,
}

impl BlindPositions {
    /// Drops any reference to a player that is gone.
    pub fn forget(&mut self, player: PlayerId) {
        for slot in [&mut self.dealer_button, &mut self.small_blind, &mut self.big_blind] {
            if *slot == Some(player) {
                *slot = None;
            }
        }
    }

    /// Moves the button and blinds forward for a new hand.
    ///
    /// `seated` is the full player list, `order` the seats in turn order and
    /// `is_eligible` tells whether a player can take part in the hand.
    pub fn rotate<F>(&mut self, seated: &[PlayerId], order: &[PlayerId], is_eligible: F)
    where
        F: Fn(PlayerId) -> bool,
    {
        for slot in [&mut self.dealer_button, &mut self.small_blind, &mut self.big_blind] {
            if slot.is_some_and(|id| !seated.contains(&id)) {
                *slot = None;
            }
        }

        let eligible = order.iter().filter(|&&p| is_eligible(p)).count();
        if eligible < 2 {
            return;
        }

        self.dealer_button = match self.dealer_button {
            None => match self.small_blind {
                Some(sb) if is_eligible(sb) => Some(sb),
                prior => next_eligible(order, prior, &is_eligible),
            },
            Some(button) => next_eligible(order, Some(button), &is_eligible),
        };
        self.small_blind = next_eligible(order, self.dealer_button, &is_eligible);
        self.big_blind = if eligible >= 3 {
            next_eligible(order, self.small_blind, &is_eligible)
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_eligible_wraps_and_skips() {
        let order = [1, 2, 3, 4];
        assert_eq!(next_eligible(&order, Some(4), |p| p != 1), Some(2));
        assert_eq!(next_eligible(&order, Some(2), |p| p == 2), None);
        assert_eq!(next_eligible(&order, None, |p| p > 2), Some(3));
        assert_eq!(next_eligible(&order, Some(9), |_| true), Some(1));
    }

    #[test]
    fn test_heads_up_alternates_without_big_blind() {
        let order = [10, 20];
        let mut positions = BlindPositions::default();
        positions.rotate(&order, &order, |_| true);
        let first = positions;
        assert!(first.dealer_button.is_some());
        assert_eq!(first.big_blind, None);
        assert_ne!(first.dealer_button, first.small_blind);

        positions.rotate(&order, &order, |_| true);
        assert_eq!(positions.dealer_button, first.small_blind);
        assert_eq!(positions.small_blind, first.dealer_button);
        assert_eq!(positions.big_blind, None);
    }

    #[test]
    fn test_three_players_get_distinct_big_blind() {
        let order = [1, 2, 3];
        let mut positions = BlindPositions::default();
        positions.rotate(&order, &order, |_| true);
        assert_eq!(positions.dealer_button, Some(1));
        assert_eq!(positions.small_blind, Some(2));
        assert_eq!(positions.big_blind, Some(3));

        positions.rotate(&order, &order, |_| true);
        assert_eq!(positions.dealer_button, Some(2));
        assert_eq!(positions.small_blind, Some(3));
        assert_eq!(positions.big_blind, Some(1));
    }

    #[test]
    fn test_rotation_skips_busted_players() {
        let order = [1, 2, 3, 4];
        let mut positions = BlindPositions {
            dealer_button: Some(1),
            small_blind: Some(2),
            big_blind: Some(3),
        };
        positions.rotate(&order, &order, |p| p != 2);
        assert_eq!(positions.dealer_button, Some(3));
        assert_eq!(positions.small_blind, Some(4));
        assert_eq!(positions.big_blind, Some(1));
    }

    #[test]
    fn test_departed_button_reseeds_from_small_blind() {
        let seated = [2, 3, 4];
        let mut positions = BlindPositions {
            dealer_button: Some(1),
            small_blind: Some(2),
            big_blind: Some(3),
        };
        positions.rotate(&seated, &seated, |_| true);
        assert_eq!(positions.dealer_button, Some(2));
        assert_eq!(positions.small_blind, Some(3));
        assert_eq!(positions.big_blind, Some(4));
    }

    #[test]
    fn test_single_eligible_player_leaves_positions() {
        let order = [1, 2];
        let mut positions = BlindPositions::default();
        positions.rotate(&order, &order, |p| p == 1);
        assert_eq!(positions, BlindPositions::default());
    }

    #[test]
    fn test_forget_clears_all_references() {
        let mut positions = BlindPositions {
            dealer_button: Some(5),
            small_blind: Some(5),
            big_blind: Some(6),
        };
        positions.forget(5);
        assert_eq!(positions.dealer_button, None);
        assert_eq!(positions.small_blind, None);
        assert_eq!(positions.big_blind, Some(6));
    }
}
