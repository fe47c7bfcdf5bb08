//! Local bot seats.
//!
//! Each bot subscribes to the table, waits for its own turn and picks one
//! of the offered choices based on a rough estimate of its hand strength.

use holdem::{
    JoinRequest, TableEvent, TableHandle, TableNotification, TableResponse,
    entities::{ActionChoice, ActionChoices, PlayerAction, PlayerId},
    game::{
        HandEvaluator, StandardEvaluator,
        eval::{HandRanking, Rank},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};
use tokio::sync::mpsc;

// Baseline strength per hand rank
const STRENGTH_HIGH_CARD: f32 = 0.1;
const STRENGTH_ONE_PAIR: f32 = 0.25;
const STRENGTH_TWO_PAIR: f32 = 0.40;
const STRENGTH_THREE_OF_A_KIND: f32 = 0.55;
const STRENGTH_STRAIGHT: f32 = 0.70;
const STRENGTH_FLUSH: f32 = 0.75;
const STRENGTH_FULL_HOUSE: f32 = 0.85;
const STRENGTH_FOUR_OF_A_KIND: f32 = 0.95;
const STRENGTH_STRAIGHT_FLUSH: f32 = 0.99;

/// Extra strength for the highest card value, up to this much.
const KICKER_BONUS: f32 = 0.1;

/// How often a weak hand bets anyway.
const BLUFF_FREQUENCY: f64 = 0.05;

/// Playing style, from loose to tight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Loose,
    Balanced,
    Tight,
}

impl Style {
    pub fn for_seat(seat: usize) -> Self {
        match seat % 3 {
            0 => Style::Loose,
            1 => Style::Balanced,
            _ => Style::Tight,
        }
    }

    /// (fold below, raise above)
    fn thresholds(self) -> (f32, f32) {
        match self {
            Style::Loose => (0.08, 0.20),
            Style::Balanced => (0.12, 0.28),
            Style::Tight => (0.18, 0.33),
        }
    }
}

/// Rough 0.0 to 1.0 strength of a ranked hand.
pub fn hand_strength(ranking: &HandRanking) -> f32 {
    let base = match ranking.strength.rank {
        Rank::HighCard => STRENGTH_HIGH_CARD,
        Rank::OnePair => STRENGTH_ONE_PAIR,
        Rank::TwoPair => STRENGTH_TWO_PAIR,
        Rank::ThreeOfAKind => STRENGTH_THREE_OF_A_KIND,
        Rank::Straight => STRENGTH_STRAIGHT,
        Rank::Flush => STRENGTH_FLUSH,
        Rank::FullHouse => STRENGTH_FULL_HOUSE,
        Rank::FourOfAKind => STRENGTH_FOUR_OF_A_KIND,
        Rank::StraightFlush => STRENGTH_STRAIGHT_FLUSH,
    };
    let kicker = ranking
        .strength
        .values
        .first()
        .map_or(0.0, |&v| f32::from(v) / 14.0 * KICKER_BONUS);
    (base + kicker).min(1.0)
}

/// Picks one of `choices`. Never returns an action the table did not offer.
pub fn decide<R: Rng>(
    strength: f32,
    style: Style,
    choices: &ActionChoices,
    rng: &mut R,
) -> PlayerAction {
    let (fold_below, raise_above) = style.thresholds();
    let aggressive = strength > raise_above || rng.random_bool(BLUFF_FREQUENCY);

    let find = |wanted: fn(&ActionChoice) -> Option<PlayerAction>| {
        choices.0.iter().find_map(wanted)
    };
    let check = || find(|c| matches!(c, ActionChoice::Check).then_some(PlayerAction::Check));
    let call = || find(|c| matches!(c, ActionChoice::Call(_)).then_some(PlayerAction::Call));
    let wager = || {
        find(|c| match c {
            ActionChoice::Bet(amount) => Some(PlayerAction::Bet(*amount)),
            ActionChoice::Raise(amount) => Some(PlayerAction::Raise(*amount)),
            _ => None,
        })
    };
    let all_in = || find(|c| matches!(c, ActionChoice::AllIn(_)).then_some(PlayerAction::AllIn));

    let action = if aggressive {
        wager().or_else(call).or_else(check).or_else(all_in)
    } else if strength >= fold_below {
        check().or_else(call).or_else(|| {
            // Calling would cost the whole stack.
            if strength >= STRENGTH_TWO_PAIR {
                all_in()
            } else {
                None
            }
        })
    } else {
        check()
    };
    action.unwrap_or(PlayerAction::Fold)
}

/// A seated bot.
pub struct Bot {
    id: PlayerId,
    name: String,
    style: Style,
    handle: TableHandle,
    think_time: Duration,
    rng: StdRng,
}

impl Bot {
    pub fn new(id: PlayerId, seat: usize, handle: TableHandle, think_time: Duration) -> Self {
        Self {
            id,
            name: format!("bot{seat}"),
            style: Style::for_seat(seat),
            handle,
            think_time,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn join_request(&self, buy_in: u32) -> JoinRequest {
        let octet = u8::try_from(self.id % 250).unwrap_or(0) + 1;
        JoinRequest::new(
            self.id,
            self.name.as_str(),
            IpAddr::V4(Ipv4Addr::new(127, 0, 1, octet)),
            buy_in,
        )
    }

    /// Subscribes, sits down and plays until the bot leaves the table or
    /// the table closes.
    pub async fn run(mut self, buy_in: u32) {
        let notifications = match self.handle.subscribe(self.id).await {
            Ok(receiver) => receiver,
            Err(e) => {
                tracing::warn!(bot = %self.name, "Could not subscribe: {e}");
                return;
            }
        };
        let response = self.handle.join(self.join_request(buy_in)).await;
        if !response.is_success() {
            tracing::warn!(
                bot = %self.name,
                "Could not join: {}",
                response.error_message().unwrap_or_default()
            );
            return;
        }
        tracing::info!(bot = %self.name, style = ?self.style, "Seated with {buy_in} chips");
        self.play(notifications).await;
    }

    async fn play(&mut self, mut notifications: mpsc::Receiver<TableNotification>) {
        while let Some(notification) = notifications.recv().await {
            let TableNotification::Event(event) = notification else {
                continue;
            };
            match event {
                TableEvent::TurnStarted {
                    player, choices, ..
                } if player == self.id => {
                    if !self.take_turn(&choices).await {
                        break;
                    }
                }
                TableEvent::PlayerLeft { player } if player == self.id => {
                    tracing::info!(bot = %self.name, "Left the table");
                    break;
                }
                _ => {}
            }
        }
        let _ = self.handle.unsubscribe(self.id).await;
    }

    /// Returns false once the table is gone.
    async fn take_turn(&mut self, choices: &ActionChoices) -> bool {
        let jitter = self.rng.random_range(0.5..1.5);
        tokio::time::sleep(self.think_time.mul_f64(jitter)).await;

        let Some(view) = self.handle.view(Some(self.id)).await else {
            return false;
        };
        let Some(me) = view.player(self.id) else {
            return false;
        };
        let Some(hole_cards) = &me.hole_cards else {
            return true;
        };
        let mut cards = hole_cards.clone();
        cards.extend_from_slice(&view.board);
        let strength = hand_strength(&StandardEvaluator.rank(&cards));

        let action = decide(strength, self.style, choices, &mut self.rng);
        tracing::debug!(bot = %self.name, strength, %action, "Acting");
        match self.handle.submit(self.id, action).await {
            TableResponse::TableClosed => false,
            response if !response.is_success() => {
                tracing::warn!(
                    bot = %self.name,
                    "Action {action} rejected: {}",
                    response.error_message().unwrap_or_default()
                );
                true
            }
            _ => true,
        }
    }
}
