//! Side pot calculation tests
//!
//! These tests verify that side pot distribution works correctly:
//! - Multiple all-ins at different amounts
//! - Folded players contribute but can't win
//! - Uneven splits drop the remainder chips
//! - Side pot eligibility based on investment levels

use chrono::Utc;
use holdem::{
    HandState, JoinRequest, PokerTable, TableConfig, TableEvent,
    entities::{Card, PlayerAction, PlayerId},
    game::{
        HandEvaluator, HandRanking,
        eval::{HandStrength, Rank},
        pot::Pot,
    },
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
};

fn strength(high: u8) -> HandStrength {
    HandStrength {
        rank: Rank::HighCard,
        values: vec![high],
    }
}

/// Every hand is worth the same, so every showdown is a split.
struct DeadHeat;

impl HandEvaluator for DeadHeat {
    fn rank(&self, _cards: &[Card]) -> HandRanking {
        HandRanking {
            strength: strength(0),
            description: "a dead heat".to_string(),
        }
    }
}

/// Ranks hands by whose hole cards they hold, once those are known.
#[derive(Default)]
struct Seating {
    scores: Mutex<HashMap<Card, u8>>,
}

impl Seating {
    fn rank_holder(&self, cards: &[Card], score: u8) {
        let mut scores = self.scores.lock().unwrap();
        for &card in cards {
            scores.insert(card, score);
        }
    }
}

impl HandEvaluator for Seating {
    fn rank(&self, cards: &[Card]) -> HandRanking {
        let scores = self.scores.lock().unwrap();
        let score = cards
            .iter()
            .filter_map(|card| scores.get(card))
            .copied()
            .max()
            .unwrap_or(0);
        HandRanking {
            strength: strength(score),
            description: format!("seat score {score}"),
        }
    }
}

#[test]
fn test_multiple_side_pots_four_players() {
    // Player 1: All-in 25
    // Player 2: All-in 75
    // Player 3: All-in 150
    // Player 4: Calls 150
    let mut pot = Pot::new();
    pot.add(1, 25);
    pot.add(2, 75);
    pot.add(3, 150);
    pot.add(4, 150);

    let tiers = pot.into_tiers(|_| false);
    let totals: Vec<u32> = tiers.iter().map(Pot::total).collect();
    assert_eq!(totals, vec![100, 150, 150]);
    assert_eq!(tiers[1].contributions().len(), 3);
    assert_eq!(tiers[2].contributions().len(), 2);
    assert_eq!(tiers[2].contribution(1), 0);
    assert_eq!(tiers[2].contribution(2), 0);
}

#[test]
fn test_short_stack_wins_only_main_pot() {
    let mut pot = Pot::new();
    pot.add(1, 50);
    pot.add(2, 100);
    pot.add(3, 100);
    let tiers = pot.into_tiers(|_| false);

    let standings: HashMap<PlayerId, HandStrength> =
        [(1, strength(14)), (2, strength(12)), (3, strength(9))].into();

    let main = tiers[0].award(&standings);
    assert_eq!(main.winners, vec![1]);
    assert_eq!(main.share, 100);
    assert_eq!(main.returned, vec![(1, 50)]);

    let side = tiers[1].award(&standings);
    assert_eq!(side.winners, vec![2]);
    assert_eq!(side.losses, vec![(3, 50)]);
    assert_eq!(side.share, 50);
}

#[test]
fn test_folded_player_cannot_win() {
    let mut pot = Pot::new();
    pot.add(1, 50);
    pot.add(2, 100);
    pot.add(3, 100);

    // Player 1 folded with the best cards: not in the standings.
    let standings: HashMap<PlayerId, HandStrength> =
        [(2, strength(12)), (3, strength(9))].into();
    let tiers = pot.into_tiers(|player| player == 1);
    let awards: Vec<_> = tiers.iter().map(|tier| tier.award(&standings)).collect();

    assert!(awards.iter().all(|award| award.winners == vec![2]));
    let won: u32 = awards.iter().map(|award| award.share).sum();
    assert_eq!(won, 150);
}

#[test]
fn test_uneven_split_reports_remainder() {
    let mut pot = Pot::new();
    pot.add(1, 100);
    pot.add(2, 100);
    pot.add(3, 101);

    let standings: HashMap<PlayerId, HandStrength> =
        [(1, strength(10)), (2, strength(10)), (3, strength(4))].into();
    let award = pot.award(&standings);
    assert_eq!(award.winners, vec![1, 2]);
    assert_eq!(award.share, 50);
    assert_eq!(award.remainder, 1);
}

fn seat(table: &mut PokerTable, id: PlayerId, buy_in: u32) {
    let request = JoinRequest::new(
        id,
        format!("player{id}"),
        IpAddr::V4(Ipv4Addr::new(10, 0, 1, id as u8)),
        buy_in,
    );
    table.check_admission(&request, Utc::now()).unwrap();
    table.seat_player(&request);
}

fn tick_until(table: &mut PokerTable, state: HandState) {
    for _ in 0..200 {
        if table.state() == state {
            return;
        }
        table.tick();
    }
    panic!("never reached {state}, stuck in {}", table.state());
}

#[test]
fn test_split_pot_drops_odd_chip() {
    let config = TableConfig {
        small_blind: 25,
        big_blind: 50,
        intermission_secs: 1,
        ..TableConfig::default()
    };
    let mut table = PokerTable::with_seed(config, 7).with_evaluator(Arc::new(DeadHeat));
    for id in 1..=3 {
        seat(&mut table, id, 2000);
    }
    tick_until(&mut table, HandState::PreflopBetting);
    assert_eq!(table.current_turn(), Some(1));

    table.submit(1, PlayerAction::Call).unwrap();
    table.submit(2, PlayerAction::Fold).unwrap();
    table.submit(3, PlayerAction::Check).unwrap();
    for street in [
        HandState::FlopBetting,
        HandState::TurnBetting,
        HandState::RiverBetting,
    ] {
        tick_until(&mut table, street);
        table.submit(3, PlayerAction::Check).unwrap();
        table.submit(1, PlayerAction::Check).unwrap();
    }
    tick_until(&mut table, HandState::Intermission);

    let stacks: Vec<u32> = table.players().iter().map(|p| p.stack).collect();
    assert_eq!(stacks, vec![2012, 1975, 2012]);
    assert_eq!(table.chips_in_play(), 5999);

    let events = table.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TableEvent::Announcement(text)
            if text.starts_with("player1 and player3 split the main pot of 75 chips")
    )));
}

#[test]
fn test_all_in_side_pot_at_table() {
    let config = TableConfig {
        intermission_secs: 1,
        ..TableConfig::default()
    };
    let mut table = PokerTable::with_seed(config, 11).with_evaluator(Arc::new(DeadHeat));
    seat(&mut table, 1, 2000);
    seat(&mut table, 2, 3000);
    seat(&mut table, 3, 4000);
    tick_until(&mut table, HandState::PreflopBetting);

    table.submit(1, PlayerAction::AllIn).unwrap();
    assert_eq!(table.min_bet(), 2000);
    table.submit(2, PlayerAction::AllIn).unwrap();
    assert_eq!(table.min_bet(), 3000);
    table.submit(3, PlayerAction::Call).unwrap();
    assert_eq!(table.current_turn(), None);

    // Nobody left to bet against: the board runs out on its own.
    tick_until(&mut table, HandState::Intermission);
    assert_eq!(table.board().len(), 5);

    let stacks: Vec<u32> = table.players().iter().map(|p| p.stack).collect();
    assert_eq!(stacks, vec![2000, 3000, 4000]);

    let completed = table.drain_completed();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].hand.final_pot, 8000);
}

#[test]
fn test_side_pot_winner_keeps_share_after_losing_main_pot() {
    let config = TableConfig {
        intermission_secs: 1,
        ..TableConfig::default()
    };
    let evaluator = Arc::new(Seating::default());
    let mut table = PokerTable::with_seed(config, 11).with_evaluator(evaluator.clone());
    seat(&mut table, 1, 2000);
    seat(&mut table, 2, 3000);
    seat(&mut table, 3, 3000);
    tick_until(&mut table, HandState::PreflopBetting);

    // Player 1 beats player 2, who beats player 3.
    for (player, score) in [(1, 14), (2, 10), (3, 5)] {
        let hole_cards = table.player(player).unwrap().hole_cards.clone();
        evaluator.rank_holder(&hole_cards, score);
    }

    table.submit(1, PlayerAction::AllIn).unwrap();
    table.submit(2, PlayerAction::AllIn).unwrap();
    table.submit(3, PlayerAction::Call).unwrap();
    tick_until(&mut table, HandState::Intermission);

    // Main pot of 6000 to player 1, side pot of 2000 to player 2.
    let stacks: Vec<u32> = table.players().iter().map(|p| p.stack).collect();
    assert_eq!(stacks, vec![6000, 2000, 0]);
    assert_eq!(stacks.iter().sum::<u32>(), 8000);
}
