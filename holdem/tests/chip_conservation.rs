//! Chip conservation under random play.
//!
//! Random players pick random legal actions (or let their clock run) for
//! hundreds of ticks. Chips may only leave the table through departures,
//! and the deck never deals a card twice.

use chrono::Utc;
use holdem::{
    HandState, JoinRequest, PokerTable, TableConfig,
    entities::{ActionChoice, Card, PlayerAction, PlayerId},
    game::{HandEvaluator, HandRanking, StandardEvaluator},
};
use proptest::prelude::*;
use std::{
    collections::HashSet,
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
};

/// Standard ranking, with ties broken by the exact cards held so pots are
/// never split.
struct NoTies;

impl HandEvaluator for NoTies {
    fn rank(&self, cards: &[Card]) -> HandRanking {
        let mut ranking = StandardEvaluator.rank(cards);
        let mut codes: Vec<u8> = cards.iter().map(|c| c.0 * 4 + c.1 as u8).collect();
        codes.sort_unstable_by(|a, b| b.cmp(a));
        ranking.strength.values.extend(codes);
        ranking
    }
}

fn config() -> TableConfig {
    TableConfig {
        small_blind: 10,
        big_blind: 20,
        min_buy_in: 200,
        max_buy_in: 2000,
        turn_secs: 4,
        intermission_secs: 1,
        ..TableConfig::default()
    }
}

fn table(players: u8, buy_ins: &[u32], seed: u64, evaluator: Arc<dyn HandEvaluator>) -> PokerTable {
    let mut table = PokerTable::with_seed(config(), seed).with_evaluator(evaluator);
    for id in 0..players {
        let request = JoinRequest::new(
            PlayerId::from(id),
            format!("p{id}"),
            IpAddr::V4(Ipv4Addr::new(10, 0, 2, id)),
            buy_ins[usize::from(id) % buy_ins.len()],
        );
        table.check_admission(&request, Utc::now()).unwrap();
        table.seat_player(&request);
    }
    table
}

fn to_action(choice: ActionChoice) -> PlayerAction {
    match choice {
        ActionChoice::Check => PlayerAction::Check,
        ActionChoice::Call(_) => PlayerAction::Call,
        ActionChoice::Bet(amount) => PlayerAction::Bet(amount),
        ActionChoice::Raise(amount) => PlayerAction::Raise(amount),
        ActionChoice::AllIn(_) => PlayerAction::AllIn,
        ActionChoice::Fold => PlayerAction::Fold,
    }
}

/// One step of random play: act when `act` is set and someone holds the
/// turn, otherwise let a second pass.
fn step(table: &mut PokerTable, act: bool, pick: usize) -> Result<(), TestCaseError> {
    match table.current_turn() {
        Some(id) if act && table.state().is_betting() => {
            let choices = table.action_choices(id).0;
            prop_assert!(!choices.is_empty());
            let action = to_action(choices[pick % choices.len()]);
            prop_assert_eq!(table.submit(id, action), Ok(()));
        }
        _ => table.tick(),
    }
    Ok(())
}

fn assert_cards_unique(table: &PokerTable) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for card in table.board() {
        prop_assert!(seen.insert(*card), "duplicate board card {card}");
    }
    for player in table.players() {
        for card in &player.hole_cards {
            prop_assert!(seen.insert(*card), "duplicate hole card {card}");
        }
    }
    prop_assert_eq!(table.deck().remaining() + table.deck().used().len(), 52);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chips_are_conserved(
        players in 2u8..=6,
        buy_ins in prop::collection::vec(200u32..=2000, 1..4),
        seed in any::<u64>(),
        moves in prop::collection::vec((any::<bool>(), 0usize..8), 1..600),
    ) {
        let mut table = table(players, &buy_ins, seed, Arc::new(NoTies));
        let total = table.chips_in_play();
        let mut paid_out = 0;

        for (act, pick) in moves {
            step(&mut table, act, pick)?;
            if table.take_settlement() {
                paid_out += table
                    .process_leaves(Utc::now())
                    .iter()
                    .map(|d| d.payout)
                    .sum::<u32>();
            }
            prop_assert_eq!(table.chips_in_play() + paid_out, total);
            assert_cards_unique(&table)?;
        }
    }

    #[test]
    fn split_pots_lose_less_than_a_chip_per_winner(
        players in 2u8..=6,
        seed in any::<u64>(),
        moves in prop::collection::vec((any::<bool>(), 0usize..8), 1..600),
    ) {
        let mut table = table(players, &[500], seed, Arc::new(StandardEvaluator));
        let total = table.chips_in_play();

        for (act, pick) in moves {
            step(&mut table, act, pick)?;
            let now = table.chips_in_play();
            prop_assert!(now <= total);
            // At most one pot per player, each losing fewer chips than it
            // has winners.
            let bound = u32::from(players) * u32::from(players);
            prop_assert!(total - now < bound * (table.hands_played() as u32 + 1));
        }
        if table.state() == HandState::Intermission {
            prop_assert!(table.current_turn().is_none());
        }
    }
}
