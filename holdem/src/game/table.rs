//! The hand-lifecycle orchestrator.
//!
//! [`PokerTable`] owns the deck, the seated players, the pots and the hand
//! state. It only changes through [`PokerTable::tick`], player submissions
//! and the seating operations, all of which are synchronous; whoever drives
//! the table is responsible for serializing those calls. Side effects that
//! need the outside world (paying players, exporting hands) are handed back
//! through [`Departure`]s, rebuy plans and [`CompletedHand`]s.

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use uuid::Uuid;

use super::{
    admission::{JoinRequest, RejoinCooldowns},
    constants::HOLE_CARDS,
    deck::Deck,
    entities::{ActionChoice, ActionChoices, ActionKind, Card, Chips, PlayerAction, PlayerId, Username, short_codes},
    errors::{ActionError, JoinError},
    eval::{HandEvaluator, HandStrength, StandardEvaluator},
    events::TableEvent,
    player::{Player, RebuyPlan},
    positions::{BlindPositions, next_eligible},
    pot::{Pot, PotAward},
    states::{HandState, StateCategory},
    view::{PlayerView, TableView},
};
use crate::{
    export::{ActionRecord, CompletedHand, HandRecord, PlayerResult},
    table::TableConfig,
};

/// A player removed from the table whose stack must be paid out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Departure {
    pub player_id: PlayerId,
    pub name: Username,
    pub payout: Chips,
}

pub struct PokerTable {
    config: TableConfig,
    state: HandState,
    deck: Deck,
    rng: StdRng,
    evaluator: Arc<dyn HandEvaluator>,
    /// Everyone seated, in seat order.
    players: Vec<Player>,
    /// Players dealt into the current hand, in seat order.
    active: Vec<PlayerId>,
    viewers: Vec<PlayerId>,
    pots: Vec<Pot>,
    board: Vec<Card>,
    positions: BlindPositions,
    current_turn: Option<PlayerId>,
    min_bet: Chips,
    min_raise: Chips,
    round_actions: Vec<ActionKind>,
    hand_id: Uuid,
    hand_started_at: DateTime<Utc>,
    action_log: Vec<ActionRecord>,
    intermission_remaining: u32,
    events: VecDeque<TableEvent>,
    completed: VecDeque<CompletedHand>,
    settlement_due: bool,
    view_changed: bool,
    cooldowns: RejoinCooldowns,
    hands_played: u64,
}

impl PokerTable {
    pub fn new(config: TableConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A table whose shuffles are reproducible.
    pub fn with_seed(config: TableConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: TableConfig, mut rng: StdRng) -> Self {
        let deck = Deck::with_rng(&mut rng);
        Self {
            config,
            state: HandState::Inactive,
            deck,
            rng,
            evaluator: Arc::new(StandardEvaluator),
            players: Vec::new(),
            active: Vec::new(),
            viewers: Vec::new(),
            pots: Vec::new(),
            board: Vec::with_capacity(5),
            positions: BlindPositions::default(),
            current_turn: None,
            min_bet: 0,
            min_raise: 0,
            round_actions: Vec::new(),
            hand_id: Uuid::nil(),
            hand_started_at: Utc::now(),
            action_log: Vec::new(),
            intermission_remaining: 0,
            events: VecDeque::new(),
            completed: VecDeque::new(),
            settlement_due: false,
            view_changed: false,
            cooldowns: RejoinCooldowns::default(),
            hands_played: 0,
        }
    }

    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn HandEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    // Accessors

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> HandState {
        self.state
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    #[must_use]
    pub fn active_players(&self) -> &[PlayerId] {
        &self.active
    }

    #[must_use]
    pub fn viewers(&self) -> &[PlayerId] {
        &self.viewers
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    #[must_use]
    pub fn positions(&self) -> BlindPositions {
        self.positions
    }

    #[must_use]
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    #[must_use]
    pub fn min_bet(&self) -> Chips {
        self.min_bet
    }

    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    #[must_use]
    pub fn round_actions(&self) -> &[ActionKind] {
        &self.round_actions
    }

    #[must_use]
    pub fn hand_id(&self) -> Uuid {
        self.hand_id
    }

    #[must_use]
    pub fn intermission_remaining(&self) -> u32 {
        self.intermission_remaining
    }

    #[must_use]
    pub fn hands_played(&self) -> u64 {
        self.hands_played
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether a hand has been dealt and not yet settled.
    #[must_use]
    pub fn hand_running(&self) -> bool {
        self.state > HandState::Inactive && self.state < HandState::Intermission
    }

    /// Stacks plus chips sitting in unsettled pots.
    #[must_use]
    pub fn chips_in_play(&self) -> Chips {
        let stacks: Chips = self.players.iter().map(|p| p.stack).sum();
        if self.hand_running() {
            stacks + self.pots.iter().map(Pot::total).sum::<Chips>()
        } else {
            stacks
        }
    }

    #[must_use]
    pub fn call_amount(&self, id: PlayerId) -> Option<Chips> {
        self.player(id).map(|p| p.call_amount(self.min_bet))
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        self.events.drain(..).collect()
    }

    pub fn drain_completed(&mut self) -> Vec<CompletedHand> {
        self.completed.drain(..).collect()
    }

    /// Whether anything visible changed since the last call.
    pub fn take_view_changed(&mut self) -> bool {
        std::mem::take(&mut self.view_changed)
    }

    /// Whether the end-of-hand settlement (rebuys, then leaves) should run.
    pub fn take_settlement(&mut self) -> bool {
        std::mem::take(&mut self.settlement_due)
    }

    // Notifications

    fn refresh(&mut self) {
        self.view_changed = true;
    }

    fn announce(&mut self, text: impl Into<String>) {
        self.events.push_back(TableEvent::Announcement(text.into()));
    }

    fn say(&mut self, player: PlayerId, text: impl Into<String>) {
        self.events.push_back(TableEvent::Said {
            player,
            text: text.into(),
        });
    }

    fn tell(&mut self, player: PlayerId, text: impl Into<String>) {
        self.events.push_back(TableEvent::Direct {
            player,
            text: text.into(),
        });
    }

    // Turn order

    fn is_eligible(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(Player::is_eligible)
    }

    /// Players in the hand who still have chips and have not folded.
    #[must_use]
    pub fn eligible_count(&self) -> usize {
        self.active.iter().filter(|&&id| self.is_eligible(id)).count()
    }

    fn unfolded_count(&self) -> usize {
        self.active
            .iter()
            .filter_map(|&id| self.player(id))
            .filter(|p| !p.has_folded)
            .count()
    }

    fn next_active(&self, from: Option<PlayerId>) -> Option<PlayerId> {
        next_eligible(&self.active, from, |id| self.is_eligible(id))
    }

    /// Whether the current betting round is over: no funded, unfolded
    /// player still has to act or owes chips. With at most one such player
    /// left the round closes as soon as nothing is owed.
    #[must_use]
    pub fn can_end_round(&self) -> bool {
        let funded: Vec<&Player> = self
            .active
            .iter()
            .filter_map(|&id| self.player(id))
            .filter(|p| p.is_eligible())
            .collect();
        if funded.len() <= 1 {
            return funded.iter().all(|p| p.call_amount(self.min_bet) == 0);
        }
        !funded
            .iter()
            .any(|p| !p.has_acted || p.call_amount(self.min_bet) > 0)
    }

    // Clock

    /// One second of table time.
    pub fn tick(&mut self) {
        match self.state {
            HandState::Intermission if self.intermission_remaining == 0 => self.reset_hand(),
            HandState::Intermission => {
                let remaining = self.intermission_remaining;
                if self.config.intermission_announcements.contains(&remaining) {
                    self.announce(format!("The next hand will begin in {remaining} seconds."));
                }
                self.intermission_remaining -= 1;
            }
            HandState::Showdown => self.do_showdown(),
            state if state.is_in_hand() => {
                self.advance_round();
                self.run_turn_clock();
            }
            _ => {}
        }
    }

    fn run_turn_clock(&mut self) {
        if !self.state.is_betting() {
            return;
        }
        let Some(id) = self.current_turn else {
            return;
        };
        let Some(player) = self.player_mut(id) else {
            return;
        };
        player.turn_remaining = player.turn_remaining.saturating_sub(1);
        let remaining = player.turn_remaining;

        if self.config.turn_warnings.contains(&remaining) {
            self.tell(
                id,
                format!(
                    "Your turn will end in {remaining} seconds. If you do not make a move before your time runs out, you will fold your hand."
                ),
            );
        }
        if remaining == 0 {
            log::debug!("Table '{}': player {id} ran out of time", self.config.name);
            self.apply(id, PlayerAction::Fold, false, true);
        }
    }

    fn advance_round(&mut self) {
        let stage = self.state;
        match stage.category() {
            StateCategory::Betting => {
                if self.can_end_round() {
                    self.current_turn = None;
                    self.state = stage.next();
                    log::debug!("Table '{}': {stage} closed", self.config.name);
                    self.refresh();
                }
            }
            StateCategory::Dealing => {
                self.reveal(stage);
                if stage == HandState::DealHoleCards {
                    self.set_up_hole();
                } else if self.eligible_count() > 1 {
                    self.set_up_betting_round();
                } else {
                    self.skip_betting_round();
                }
                // A fold during setup may already have settled the hand.
                if self.state == stage {
                    self.rank_hands();
                    self.state = stage.next();
                }
                self.refresh();
            }
            StateCategory::Terminal => {}
        }
    }

    fn reveal(&mut self, stage: HandState) {
        let count = stage.community_cards();
        if count == 0 {
            return;
        }
        let cards: Vec<Card> = (0..count).map(|_| self.deck.draw()).collect();
        let names: Vec<String> = cards.iter().map(Card::name).collect();
        self.board.extend(cards);
        self.announce(format!("The {stage} shows: {}.", names.join(", ")));
    }

    fn set_up_hole(&mut self) {
        for _ in 0..HOLE_CARDS {
            for idx in 0..self.active.len() {
                let id = self.active[idx];
                let card = self.deck.draw();
                if let Some(player) = self.player_mut(id) {
                    player.hole_cards.push(card);
                }
            }
        }
        for idx in 0..self.active.len() {
            let id = self.active[idx];
            if let Some(player) = self.player(id) {
                let text = format!("You were dealt {}.", short_codes(&player.hole_cards));
                self.tell(id, text);
            }
        }

        // Heads-up there is no big blind: the dealer posts the small blind
        // and the other player the big blind.
        let BlindPositions {
            dealer_button,
            small_blind,
            big_blind,
        } = self.positions;
        let small_poster = if big_blind.is_some() { small_blind } else { dealer_button };
        let big_poster = big_blind.or(small_blind);
        if let Some(id) = small_poster {
            self.apply(id, PlayerAction::Bet(self.config.small_blind), true, false);
        }
        if let Some(id) = big_poster {
            self.apply(id, PlayerAction::Bet(self.config.big_blind), true, false);
        }

        self.current_turn = big_poster;
        self.assign_next_turn();
    }

    fn set_up_betting_round(&mut self) {
        self.clear_round();
        self.current_turn = self.positions.dealer_button;
        self.assign_next_turn();
    }

    /// Nobody can bet: the cards keep coming without anyone acting.
    fn skip_betting_round(&mut self) {
        self.clear_round();
        self.current_turn = None;
    }

    fn clear_round(&mut self) {
        self.min_bet = 0;
        self.min_raise = 0;
        self.round_actions.clear();
        for idx in 0..self.active.len() {
            let id = self.active[idx];
            if let Some(player) = self.player_mut(id) {
                player.clear_round();
            }
        }
    }

    fn rank_hands(&mut self) {
        let board = self.board.clone();
        let evaluator = Arc::clone(&self.evaluator);
        for player in &mut self.players {
            if !self.active.contains(&player.id) || player.hole_cards.is_empty() {
                continue;
            }
            if player.has_folded && self.state != HandState::DetermineWinners {
                continue;
            }
            let mut cards = player.hole_cards.clone();
            cards.extend_from_slice(&board);
            player.ranking = Some(evaluator.rank(&cards));
        }
    }

    fn assign_next_turn(&mut self) {
        self.current_turn = self.next_active(self.current_turn);
        self.refresh();

        let Some(id) = self.current_turn else {
            return;
        };
        let turn_secs = self.config.turn_secs;
        let Some(player) = self.player_mut(id) else {
            return;
        };
        player.turn_remaining = turn_secs;
        let leaving = player.request_leave || !player.connected;

        if leaving {
            self.apply(id, PlayerAction::Fold, false, true);
            return;
        }
        if self.eligible_count() == 1 && self.can_end_round() {
            self.apply(id, PlayerAction::Check, false, true);
            return;
        }

        let choices = self.action_choices(id);
        self.events.push_back(TableEvent::TurnStarted {
            player: id,
            choices,
            seconds: turn_secs,
        });
    }

    // Actions

    /// Legal choices for a player, with suggested amounts.
    #[must_use]
    pub fn action_choices(&self, id: PlayerId) -> ActionChoices {
        let Some(player) = self.player(id) else {
            return ActionChoices::default();
        };
        let call = player.call_amount(self.min_bet);
        let stack = player.stack;
        let mut choices = Vec::with_capacity(4);

        if call == 0 {
            choices.push(ActionChoice::Check);
        } else if call < stack {
            choices.push(ActionChoice::Call(call));
        }
        if self.round_actions.contains(&ActionKind::Bet) {
            if call.saturating_add(self.min_raise) < stack {
                choices.push(ActionChoice::Raise(self.min_raise));
            }
        } else {
            let minimum = self.config.big_blind.max(self.min_bet);
            if minimum < stack {
                choices.push(ActionChoice::Bet(minimum));
            }
        }
        if stack > 0 {
            choices.push(ActionChoice::AllIn(stack));
        }
        choices.push(ActionChoice::Fold);
        ActionChoices(choices)
    }

    /// A player's action submission.
    ///
    /// Submissions from anyone but the current turn holder, or outside a
    /// betting round, are dropped without error.
    pub fn submit(&mut self, id: PlayerId, action: PlayerAction) -> Result<(), ActionError> {
        let Some(player) = self.player(id) else {
            return Err(ActionError::NotSeated);
        };
        if self.current_turn != Some(id) || !self.state.is_betting() {
            log::debug!(
                "Table '{}': dropping {action:?} from {id}, not their turn",
                self.config.name
            );
            return Ok(());
        }
        let action = self.validate(player, action)?;
        self.apply(id, action, false, true);
        Ok(())
    }

    /// Checks an action against the table and turns edge cases into the
    /// action they amount to (betting the whole stack is an all-in, calling
    /// nothing is a check).
    fn validate(&self, player: &Player, action: PlayerAction) -> Result<PlayerAction, ActionError> {
        let call = player.call_amount(self.min_bet);
        let stack = player.stack;
        match action {
            PlayerAction::Bet(amount) => {
                if self.round_actions.contains(&ActionKind::Bet) {
                    return Err(ActionError::BetAlreadyPlaced);
                }
                let minimum = self.config.big_blind.max(self.min_bet);
                if amount < minimum {
                    return Err(ActionError::BetTooSmall { minimum });
                }
                if amount > stack {
                    return Err(ActionError::InsufficientChips { stack });
                }
                if amount == stack {
                    return Ok(PlayerAction::AllIn);
                }
                Ok(action)
            }
            PlayerAction::Raise(amount) => {
                if !self.round_actions.contains(&ActionKind::Bet) {
                    return Err(ActionError::NoBetToRaise);
                }
                if amount < self.min_raise || amount == 0 {
                    return Err(ActionError::RaiseTooSmall {
                        minimum: self.min_raise.max(1),
                    });
                }
                let needed = call.saturating_add(amount);
                if needed > stack {
                    return Err(ActionError::RaiseTooLarge);
                }
                if needed == stack {
                    return Ok(PlayerAction::AllIn);
                }
                Ok(action)
            }
            PlayerAction::Call if call == 0 => Ok(PlayerAction::Check),
            PlayerAction::Call if call >= stack => Ok(PlayerAction::AllIn),
            PlayerAction::Check if call > 0 => Err(ActionError::CannotCheck { call }),
            PlayerAction::Call | PlayerAction::Check | PlayerAction::Fold | PlayerAction::AllIn => {
                Ok(action)
            }
        }
    }

    /// Applies an already validated action.
    ///
    /// Forced actions (blinds) skip the turn check, do not count as the
    /// player having acted and never pass the turn on.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not dealt into the current hand.
    fn apply(&mut self, id: PlayerId, action: PlayerAction, forced: bool, verbose: bool) {
        if !forced && self.current_turn != Some(id) {
            return;
        }
        assert!(
            self.active.contains(&id),
            "player {id} acted but is not part of the current hand"
        );

        let min_bet = self.min_bet;
        let reraise = self.round_actions.contains(&ActionKind::Raise);
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            panic!("player {id} is in the hand but not seated");
        };
        let call = player.call_amount(min_bet);

        let (message, committed) = match action {
            PlayerAction::Bet(amount) => {
                let committed = player.commit(amount);
                self.min_bet = amount;
                self.min_raise = amount.saturating_mul(2);
                (format!("I bet {amount}."), committed)
            }
            PlayerAction::Raise(amount) => {
                let committed = player.commit(call.saturating_add(amount));
                self.min_bet = self.min_bet.saturating_add(amount);
                self.min_raise = amount;
                let verb = if reraise { "reraise" } else { "raise" };
                (format!("I {verb} {amount}."), committed)
            }
            PlayerAction::Call => ("I call.".to_string(), player.commit(call)),
            PlayerAction::Check => ("Check.".to_string(), 0),
            PlayerAction::Fold => {
                player.has_folded = true;
                ("I fold.".to_string(), 0)
            }
            PlayerAction::AllIn if player.stack > 0 => {
                let message = if call >= player.stack {
                    "I call: all-in."
                } else {
                    "All in."
                };
                let total = player.stack + player.round_contribution;
                if total > self.min_bet {
                    self.min_bet = total;
                }
                let stack = player.stack;
                (message.to_string(), player.commit(stack))
            }
            PlayerAction::AllIn => (String::new(), 0),
        };
        if !forced {
            player.has_acted = true;
        }

        if let Some(pot) = self.pots.first_mut() {
            pot.add(id, committed);
        }
        self.action_log.push(ActionRecord {
            hand_id: self.hand_id,
            player_id: id,
            state: self.state.id(),
            action: action.kind().id(),
            amount: committed,
        });
        self.round_actions.push(action.kind());
        log::debug!(
            "Table '{}': {id} {action} ({committed} committed) during {}",
            self.config.name,
            self.state
        );
        if verbose && !message.is_empty() {
            self.say(id, message);
        }
        self.refresh();

        if action == PlayerAction::Fold && self.unfolded_count() == 1 {
            self.do_showdown();
            return;
        }
        if !forced {
            if self.can_end_round() {
                self.current_turn = None;
            } else {
                self.assign_next_turn();
            }
        }
    }

    // Settlement

    fn do_showdown(&mut self) {
        self.state = HandState::DetermineWinners;
        self.current_turn = None;
        self.refresh();
        self.create_side_pots();
        self.determine_winners();
        self.record_completed_hand();
        self.end_hand();
    }

    fn create_side_pots(&mut self) {
        let pots = std::mem::take(&mut self.pots);
        let players = &self.players;
        let is_folded = |id: PlayerId| {
            players
                .iter()
                .find(|p| p.id == id)
                .is_none_or(|p| p.has_folded)
        };
        let tiers: Vec<Pot> = pots
            .into_iter()
            .flat_map(|pot| pot.into_tiers(is_folded))
            .collect();
        if tiers.len() > 1 {
            log::debug!(
                "Table '{}': split into {} pots",
                self.config.name,
                tiers.len()
            );
        }
        self.pots = tiers;
    }

    fn determine_winners(&mut self) {
        self.rank_hands();

        let standings: HashMap<PlayerId, HandStrength> = self
            .active
            .iter()
            .filter_map(|&id| self.player(id))
            .filter(|p| !p.has_folded)
            .filter_map(|p| p.ranking.as_ref().map(|r| (p.id, r.strength.clone())))
            .collect();
        let awards: Vec<(Chips, PotAward)> = self
            .pots
            .iter()
            .filter(|pot| !pot.is_empty())
            .map(|pot| (pot.total(), pot.award(&standings)))
            .collect();

        let num_pots = awards.len();
        for (idx, (total, award)) in awards.into_iter().enumerate() {
            for &(id, amount) in &award.losses {
                if let Some(player) = self.player_mut(id) {
                    player.record_loss(amount);
                }
            }
            for &(id, amount) in &award.returned {
                if let Some(player) = self.player_mut(id) {
                    player.award_share(award.share);
                    player.return_credit(amount);
                }
            }
            if award.remainder > 0 {
                log::debug!(
                    "Table '{}': {} chip(s) of an uneven split are not awarded",
                    self.config.name,
                    award.remainder
                );
            }
            self.announce_pot_winners(idx, num_pots, total, &award);
        }

        for idx in 0..self.active.len() {
            let id = self.active[idx];
            let Some(player) = self.player_mut(id) else {
                continue;
            };
            let credit = player.distribute_credit();
            if credit.won > 0 {
                self.say(id, format!("Won {} chips.", credit.won));
            } else if credit.lost > 0 {
                self.say(id, format!("Lost {} chips.", credit.lost));
            }
            if credit.returned > 0 {
                self.tell(
                    id,
                    format!("{} chips have been returned to you.", credit.returned),
                );
            }
        }
    }

    fn announce_pot_winners(&mut self, idx: usize, num_pots: usize, total: Chips, award: &PotAward) {
        let names: Vec<String> = award
            .winners
            .iter()
            .filter_map(|&id| self.player(id))
            .map(|p| p.name.to_string())
            .collect();
        let pot_name = match idx {
            _ if num_pots == 1 => "the pot".to_string(),
            0 => "the main pot".to_string(),
            n => format!("side pot {n}"),
        };
        let hand = award
            .winners
            .first()
            .and_then(|&id| self.player(id))
            .filter(|_| self.unfolded_count() > 1)
            .and_then(|p| p.ranking.as_ref())
            .map(|r| format!(" with {r}"))
            .unwrap_or_default();
        self.announce(format!(
            "{} {} {pot_name} of {total} chips{hand}.",
            names.join(" and "),
            if names.len() == 1 { "wins" } else { "split" },
        ));
    }

    fn record_completed_hand(&mut self) {
        let final_pot: Chips = self.pots.iter().map(Pot::total).sum();
        let hand = HandRecord {
            hand_id: self.hand_id,
            table: self.config.name.clone(),
            started_at: self.hand_started_at,
            ended_at: Utc::now(),
            final_pot,
            community_cards: short_codes(&self.board),
        };
        let players = self
            .active
            .iter()
            .filter_map(|&id| self.player(id))
            .map(|p| PlayerResult {
                hand_id: self.hand_id,
                player_id: p.id,
                won: p.amount_won,
                starting_stack: p.starting_stack,
                folded: p.has_folded,
                hole_cards: short_codes(&p.hole_cards),
                hand: p
                    .ranking
                    .as_ref()
                    .map(|r| r.description.clone())
                    .unwrap_or_default(),
            })
            .collect();
        let actions = std::mem::take(&mut self.action_log);
        self.completed.push_back(CompletedHand {
            hand,
            actions,
            players,
        });
        self.events.push_back(TableEvent::HandFinished {
            hand_id: self.hand_id,
            pot: final_pot,
        });
        log::info!(
            "Table '{}': hand {} finished, pot {final_pot}",
            self.config.name,
            self.hand_id
        );
    }

    fn end_hand(&mut self) {
        self.state = HandState::Inactive;
        self.current_turn = None;
        self.hands_played += 1;
        self.settlement_due = true;
        self.start_intermission();
        self.refresh();
    }

    fn start_intermission(&mut self) {
        self.state = HandState::Intermission;
        self.intermission_remaining = self.config.intermission_secs;
    }

    fn reset_hand(&mut self) {
        self.state = HandState::Inactive;
        self.round_actions.clear();
        self.board.clear();
        self.deck = Deck::with_rng(&mut self.rng);
        self.pots.clear();
        self.current_turn = None;
        self.min_bet = 0;
        self.min_raise = 0;
        for player in &mut self.players {
            player.clear_hand();
        }
        self.active = self
            .players
            .iter()
            .filter(|p| p.stack > 0)
            .map(|p| p.id)
            .collect();

        if self.eligible_count() > 1 {
            self.begin_hand();
        } else {
            self.announce("There were not enough players to start a new hand.");
            log::info!("Table '{}': not enough players, stopping", self.config.name);
            self.active.clear();
        }
        self.refresh();
    }

    fn begin_hand(&mut self) {
        self.hand_id = Uuid::new_v4();
        self.hand_started_at = Utc::now();
        self.action_log.clear();

        let seated: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        let mut positions = self.positions;
        positions.rotate(&seated, &self.active, |id| self.is_eligible(id));
        self.positions = positions;

        self.pots.push(Pot::new());
        self.state = HandState::DealHoleCards;
        self.events.push_back(TableEvent::HandStarted {
            hand_id: self.hand_id,
        });
        log::info!(
            "Table '{}': hand {} started with {} players",
            self.config.name,
            self.hand_id,
            self.active.len()
        );
    }

    // Seating

    /// Runs every admission check except the funds withdrawal, which the
    /// caller performs afterwards.
    pub fn check_admission(&self, request: &JoinRequest, now: DateTime<Utc>) -> Result<(), JoinError> {
        if !request.privileged
            && self
                .players
                .iter()
                .any(|p| p.address == request.address && p.id != request.player_id)
        {
            return Err(JoinError::DuplicateAddress);
        }
        if let Some(seconds) = self.cooldowns.remaining(request.player_id, now) {
            return Err(JoinError::Cooldown { seconds });
        }
        if request.in_combat(now, self.config.combat_lockout_secs) {
            return Err(JoinError::InCombat);
        }
        if request.in_group {
            return Err(JoinError::InGroup);
        }
        if request.distance > self.config.join_range {
            return Err(JoinError::TooFar);
        }
        if self.player(request.player_id).is_some() {
            return Err(JoinError::AlreadySeated);
        }
        if self.players.len() >= self.config.max_players {
            return Err(JoinError::TableFull);
        }
        if !self.config.accepts_buy_in(request.buy_in) {
            return Err(JoinError::BuyInOutOfRange {
                min: self.config.min_buy_in,
                max: self.config.max_buy_in,
            });
        }
        Ok(())
    }

    /// Seats a player whose admission passed and whose buy-in has been
    /// withdrawn.
    pub fn seat_player(&mut self, request: &JoinRequest) {
        let mut player = Player::new(
            request.player_id,
            request.name.clone(),
            request.address,
            request.buy_in,
        );
        player.privileged = request.privileged;
        self.players.push(player);
        self.viewers.retain(|&id| id != request.player_id);

        self.announce(format!(
            "{} sits down with {} chips.",
            request.name, request.buy_in
        ));
        self.events.push_back(TableEvent::PlayerJoined {
            player: request.player_id,
        });
        log::info!(
            "Table '{}': player {} ({}) seated with {} chips",
            self.config.name,
            request.player_id,
            request.name,
            request.buy_in
        );

        if self.players.len() > 1 && self.state == HandState::Inactive {
            self.start_intermission();
        }
        self.refresh();
    }

    /// Asks to leave. Outside a running hand the player is removed right
    /// away and the departure returned; otherwise they leave when the hand
    /// ends, folding now if it is their turn.
    pub fn request_leave(&mut self, id: PlayerId, now: DateTime<Utc>) -> Result<Option<Departure>, ActionError> {
        let in_hand = self.hand_running() && self.active.contains(&id);
        let Some(player) = self.player_mut(id) else {
            return Err(ActionError::NotSeated);
        };
        if !in_hand {
            return Ok(Some(self.remove_player(id, now)));
        }
        player.request_leave = true;
        self.tell(id, "You will leave the table at the end of this hand.");
        if self.current_turn == Some(id) && self.state.is_betting() {
            self.apply(id, PlayerAction::Fold, false, true);
        }
        self.refresh();
        Ok(None)
    }

    pub fn mark_disconnected(&mut self, id: PlayerId) -> Result<(), ActionError> {
        let Some(player) = self.player_mut(id) else {
            return Err(ActionError::NotSeated);
        };
        player.connected = false;
        log::info!("Table '{}': player {id} disconnected", self.config.name);
        if !self.hand_running() {
            self.settlement_due = true;
        }
        Ok(())
    }

    /// Queues extra chips, withdrawn when the hand ends.
    pub fn request_rebuy(&mut self, id: PlayerId, amount: Chips) -> Result<(), ActionError> {
        if amount == 0 {
            return Err(ActionError::InvalidAmount);
        }
        let Some(player) = self.player_mut(id) else {
            return Err(ActionError::NotSeated);
        };
        player.pending_credit = player.pending_credit.saturating_add(amount);
        let pending = player.pending_credit;
        if self.hand_running() {
            self.tell(
                id,
                format!("{pending} chips will be added to your stack when this hand ends."),
            );
        } else {
            self.settlement_due = true;
        }
        Ok(())
    }

    /// Clears every pending rebuy and returns the withdrawals to attempt.
    /// Requests that cannot be honored are answered here.
    pub fn take_rebuy_plans(&mut self) -> Vec<(PlayerId, Chips)> {
        let (min, max) = (self.config.min_buy_in, self.config.max_buy_in);
        let mut withdrawals = Vec::new();
        let mut replies = Vec::new();
        for player in &mut self.players {
            let Some(plan) = player.rebuy_plan(min, max) else {
                continue;
            };
            player.pending_credit = 0;
            match plan {
                RebuyPlan::Withdraw(amount) => withdrawals.push((player.id, amount)),
                RebuyPlan::AtMaximum => replies.push((
                    player.id,
                    "You cannot withdraw any further currency as you are at or above the max buy-in.",
                )),
                RebuyPlan::BelowMinimum => replies.push((
                    player.id,
                    "Your current rebuy-in amount does not meet the minimum buy-in for this hand.",
                )),
            }
        }
        for (id, text) in replies {
            self.tell(id, text);
        }
        withdrawals
    }

    /// Adds withdrawn rebuy chips to a stack.
    pub fn credit_rebuy(&mut self, id: PlayerId, amount: Chips) {
        let Some(player) = self.player_mut(id) else {
            log::error!(
                "Table '{}': rebuy of {amount} for unseated player {id}",
                self.config.name
            );
            return;
        };
        player.stack = player.stack.saturating_add(amount);
        self.tell(id, format!("You have withdrawn {amount} chips."));
        self.refresh();
    }

    pub fn reject_rebuy(&mut self, id: PlayerId) {
        self.tell(
            id,
            "Your bank did not contain enough currency to withdraw your pending credit.",
        );
    }

    /// Removes everyone who asked to leave, disconnected, or cannot cover
    /// the big blind.
    ///
    /// Only valid between hands.
    pub fn process_leaves(&mut self, now: DateTime<Utc>) -> Vec<Departure> {
        if self.hand_running() {
            return Vec::new();
        }
        let big_blind = self.config.big_blind;
        let leaving: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| !p.connected || p.stack < big_blind || p.request_leave)
            .map(|p| p.id)
            .collect();
        self.cooldowns.prune(now);
        leaving
            .into_iter()
            .map(|id| self.remove_player(id, now))
            .collect()
    }

    fn remove_player(&mut self, id: PlayerId, now: DateTime<Utc>) -> Departure {
        self.positions.forget(id);
        self.active.retain(|&p| p != id);
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .unwrap_or_else(|| panic!("removing unseated player {id}"));
        let player = self.players.remove(idx);
        if !self.viewers.contains(&id) {
            self.viewers.push(id);
        }
        self.cooldowns
            .start(id, now, self.config.rejoin_cooldown_secs);
        if self.current_turn == Some(id) {
            self.current_turn = None;
        }

        self.tell(id, "You have left the poker table.");
        self.announce(format!("{} has left the table.", player.name));
        self.events.push_back(TableEvent::PlayerLeft { player: id });
        log::info!(
            "Table '{}': player {id} ({}) left with {} chips",
            self.config.name,
            player.name,
            player.stack
        );
        self.refresh();

        Departure {
            player_id: id,
            name: player.name,
            payout: player.stack,
        }
    }

    /// Closes the table: unsettled contributions go back to their owners
    /// and every player is removed.
    pub fn dissolve(&mut self, now: DateTime<Utc>) -> Vec<Departure> {
        if self.hand_running() {
            let mut refunds: HashMap<PlayerId, Chips> = HashMap::new();
            for pot in &self.pots {
                for (&id, &amount) in pot.contributions() {
                    *refunds.entry(id).or_default() += amount;
                }
            }
            for (id, amount) in refunds {
                if let Some(player) = self.player_mut(id) {
                    player.stack = player.stack.saturating_add(amount);
                }
            }
            log::warn!(
                "Table '{}': closed mid-hand, contributions refunded",
                self.config.name
            );
        }
        self.pots.clear();
        self.state = HandState::Inactive;
        self.current_turn = None;
        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        ids.into_iter()
            .map(|id| self.remove_player(id, now))
            .collect()
    }

    // Viewers

    pub fn add_viewer(&mut self, id: PlayerId) {
        if self.player(id).is_none() && !self.viewers.contains(&id) {
            self.viewers.push(id);
        }
    }

    pub fn remove_viewer(&mut self, id: PlayerId) {
        self.viewers.retain(|&v| v != id);
    }

    /// Snapshot of the table as `viewer` may see it.
    #[must_use]
    pub fn view_for(&self, viewer: Option<PlayerId>) -> TableView {
        let settled = matches!(
            self.state,
            HandState::DetermineWinners | HandState::Intermission
        ) && self.unfolded_count() > 1;
        let players = self
            .players
            .iter()
            .map(|p| {
                let in_hand = self.active.contains(&p.id);
                let visible = viewer == Some(p.id) || (settled && in_hand && !p.has_folded);
                PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    stack: p.stack,
                    round_contribution: p.round_contribution,
                    has_folded: p.has_folded,
                    has_acted: p.has_acted,
                    is_all_in: in_hand && p.is_all_in() && !p.hole_cards.is_empty(),
                    in_hand,
                    hole_cards: (visible && !p.hole_cards.is_empty()).then(|| p.hole_cards.clone()),
                    hand_description: if visible {
                        p.ranking.as_ref().map(|r| r.description.clone())
                    } else {
                        None
                    },
                    turn_remaining: (self.current_turn == Some(p.id)).then_some(p.turn_remaining),
                    leaving: p.request_leave,
                }
            })
            .collect();
        TableView {
            name: self.config.name.clone(),
            state: self.state,
            board: self.board.clone(),
            pots: self.pots.iter().map(Pot::total).collect(),
            positions: self.positions,
            current_turn: self.current_turn,
            min_bet: self.min_bet,
            min_raise: self.min_raise,
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            intermission_remaining: (self.state == HandState::Intermission)
                .then_some(self.intermission_remaining),
            players,
            viewers: self.viewers.len(),
        }
    }
}
