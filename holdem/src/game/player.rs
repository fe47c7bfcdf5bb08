//! Per-seat player ledger.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::{
    eval::HandRanking,
    entities::{Card, Chips, PlayerId, Username},
};

/// One seated participant. Created on buy-in, dropped when the player
/// leaves, busts or disconnects.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: Username,
    pub address: IpAddr,
    /// Administrative override: skips the duplicate address check.
    pub privileged: bool,
    pub stack: Chips,
    /// Stack at the start of the current hand.
    pub starting_stack: Chips,
    /// Chips committed during the current betting round.
    pub round_contribution: Chips,
    pub has_acted: bool,
    pub has_folded: bool,
    pub hole_cards: Vec<Card>,
    /// Seconds left on the player's turn.
    pub turn_remaining: u32,
    /// Net result of the current hand: winnings from other players are
    /// positive, the player's own lost stakes negative.
    pub amount_won: i64,
    /// Pot shares won this hand, before losses on other pots are netted.
    pub winnings: Chips,
    /// Own stake handed back after winning a pot.
    pub amount_to_return: Chips,
    /// Chips requested through a rebuy, processed when the hand ends.
    pub pending_credit: Chips,
    pub request_leave: bool,
    pub connected: bool,
    pub ranking: Option<HandRanking>,
}

/// Net settlement of one hand for one player.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Credit {
    pub won: Chips,
    pub lost: Chips,
    pub returned: Chips,
}

/// What processing a player's pending credit should do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RebuyPlan {
    /// Withdraw this many chips from custody.
    Withdraw(Chips),
    /// The stack is already at or above the maximum buy-in.
    AtMaximum,
    /// Stack plus pending credit would still be short of the minimum.
    BelowMinimum,
}

impl Player {
    pub fn new(id: PlayerId, name: Username, address: IpAddr, buy_in: Chips) -> Self {
        Self {
            id,
            name,
            address,
            privileged: false,
            stack: buy_in,
            starting_stack: buy_in,
            round_contribution: 0,
            has_acted: false,
            has_folded: false,
            hole_cards: Vec::with_capacity(2),
            turn_remaining: 0,
            amount_won: 0,
            winnings: 0,
            amount_to_return: 0,
            pending_credit: 0,
            request_leave: false,
            connected: true,
            ranking: None,
        }
    }

    /// Resets everything tied to the previous hand.
    pub fn clear_hand(&mut self) {
        self.starting_stack = self.stack;
        self.amount_won = 0;
        self.winnings = 0;
        self.amount_to_return = 0;
        self.has_folded = false;
        self.hole_cards.clear();
        self.ranking = None;
        self.turn_remaining = 0;
        self.clear_round();
    }

    pub fn clear_round(&mut self) {
        self.round_contribution = 0;
        self.has_acted = false;
    }

    /// Moves up to `amount` chips from the stack into this round's
    /// contribution and returns how many actually moved.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let amount = amount.min(self.stack);
        self.stack -= amount;
        self.round_contribution += amount;
        amount
    }

    /// Still able to act: has chips behind and has not folded.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.stack > 0 && !self.has_folded
    }

    #[must_use]
    pub fn is_all_in(&self) -> bool {
        self.stack == 0 && !self.has_folded
    }

    /// Chips owed to match the table's minimum bet.
    #[must_use]
    pub fn call_amount(&self, min_bet: Chips) -> Chips {
        min_bet.saturating_sub(self.round_contribution)
    }

    /// Records a stake lost to the winners of one pot.
    pub fn record_loss(&mut self, amount: Chips) {
        self.amount_won -= i64::from(amount);
    }

    /// Records a share of a pot won from other players.
    pub fn award_share(&mut self, share: Chips) {
        self.amount_won += i64::from(share);
        self.winnings = self.winnings.saturating_add(share);
    }

    pub fn return_credit(&mut self, amount: Chips) {
        self.amount_to_return += amount;
    }

    /// Pays out winnings and returned stakes onto the stack. Losses were
    /// already taken out of the stack when the chips were committed, so only
    /// the reported credit is netted.
    pub fn distribute_credit(&mut self) -> Credit {
        let mut credit = Credit::default();
        if self.amount_won > 0 {
            credit.won = Chips::try_from(self.amount_won).unwrap_or(Chips::MAX);
        } else if self.amount_won < 0 {
            credit.lost = Chips::try_from(-self.amount_won).unwrap_or(Chips::MAX);
        }
        credit.returned = self.amount_to_return;
        self.stack = self
            .stack
            .saturating_add(self.winnings)
            .saturating_add(self.amount_to_return);
        credit
    }

    /// Decides how much pending credit can be withdrawn while keeping the
    /// stack inside the buy-in bounds. `None` when nothing is pending.
    #[must_use]
    pub fn rebuy_plan(&self, min_buy_in: Chips, max_buy_in: Chips) -> Option<RebuyPlan> {
        if self.pending_credit == 0 {
            return None;
        }
        let total = self.stack.saturating_add(self.pending_credit);
        let plan = if (min_buy_in..=max_buy_in).contains(&total) {
            RebuyPlan::Withdraw(self.pending_credit)
        } else if total > max_buy_in {
            match max_buy_in.saturating_sub(self.stack) {
                0 => RebuyPlan::AtMaximum,
                diff => RebuyPlan::Withdraw(diff),
            }
        } else {
            RebuyPlan::BelowMinimum
        };
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn player(stack: Chips) -> Player {
        Player::new(1, "alice".into(), IpAddr::V4(Ipv4Addr::LOCALHOST), stack)
    }

    #[test]
    fn test_commit_clamps_to_stack() {
        let mut p = player(30);
        assert_eq!(p.commit(20), 20);
        assert_eq!(p.commit(20), 10);
        assert_eq!(p.stack, 0);
        assert_eq!(p.round_contribution, 30);
        assert!(p.is_all_in());
        assert!(!p.is_eligible());
    }

    #[test]
    fn test_call_amount_never_negative() {
        let mut p = player(100);
        p.commit(40);
        assert_eq!(p.call_amount(60), 20);
        assert_eq!(p.call_amount(20), 0);
    }

    #[test]
    fn test_clear_hand_records_starting_stack() {
        let mut p = player(100);
        p.commit(40);
        p.has_folded = true;
        p.record_loss(40);
        p.clear_hand();
        assert_eq!(p.starting_stack, 60);
        assert_eq!(p.round_contribution, 0);
        assert_eq!(p.amount_won, 0);
        assert!(!p.has_folded);
    }

    #[test]
    fn test_distribute_credit_winner() {
        let mut p = player(100);
        p.commit(50);
        p.award_share(75);
        p.return_credit(50);
        let credit = p.distribute_credit();
        assert_eq!(
            credit,
            Credit {
                won: 75,
                lost: 0,
                returned: 50
            }
        );
        assert_eq!(p.stack, 175);
    }

    #[test]
    fn test_distribute_credit_loser_keeps_stack() {
        let mut p = player(100);
        p.commit(50);
        p.record_loss(50);
        let credit = p.distribute_credit();
        assert_eq!(credit.lost, 50);
        assert_eq!(p.stack, 50);
    }

    #[test]
    fn test_distribute_credit_pays_share_despite_lost_side_pot() {
        // Won the main pot (1000 share, 1000 own stake back) and lost 1000
        // to a bigger stack in a side pot.
        let mut p = player(3000);
        p.commit(3000);
        p.award_share(1000);
        p.return_credit(1000);
        p.record_loss(1000);
        let credit = p.distribute_credit();
        assert_eq!(
            credit,
            Credit {
                won: 0,
                lost: 0,
                returned: 1000
            }
        );
        assert_eq!(p.stack, 2000);
    }

    #[test]
    fn test_rebuy_plan_within_bounds() {
        let mut p = player(100);
        assert_eq!(p.rebuy_plan(100, 1000), None);
        p.pending_credit = 300;
        assert_eq!(p.rebuy_plan(100, 1000), Some(RebuyPlan::Withdraw(300)));
    }

    #[test]
    fn test_rebuy_plan_capped_at_max() {
        let mut p = player(800);
        p.pending_credit = 500;
        assert_eq!(p.rebuy_plan(100, 1000), Some(RebuyPlan::Withdraw(200)));
        p.stack = 1000;
        assert_eq!(p.rebuy_plan(100, 1000), Some(RebuyPlan::AtMaximum));
    }

    #[test]
    fn test_rebuy_plan_below_min() {
        let mut p = player(10);
        p.pending_credit = 20;
        assert_eq!(p.rebuy_plan(100, 1000), Some(RebuyPlan::BelowMinimum));
    }
}
