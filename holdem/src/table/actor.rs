//! Table actor implementation with async message handling.

use super::{
    TableId,
    config::TableConfig,
    messages::{TableMessage, TableNotification, TableResponse, TableStateResponse},
};
use crate::{
    export::ExportQueue,
    game::{
        admission::JoinRequest,
        entities::{Chips, PlayerAction, PlayerId},
        errors::JoinError,
        events::TableEvent,
        pot::Pot,
        table::{Departure, PokerTable},
        view::TableView,
    },
    wallet::{CurrencyCustody, WalletError},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, Interval, interval_at},
};

/// Capacity of a subscriber's notification channel
const SUBSCRIBER_CAPACITY: usize = 256;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Table is closed".to_string())
    }

    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<TableResponse>) -> TableMessage,
    ) -> TableResponse {
        let (response, reply) = oneshot::channel();
        if self.send(build(response)).await.is_err() {
            return TableResponse::TableClosed;
        }
        reply.await.unwrap_or(TableResponse::TableClosed)
    }

    pub async fn join(&self, request: JoinRequest) -> TableResponse {
        self.request(|response| TableMessage::Join { request, response })
            .await
    }

    pub async fn leave(&self, player_id: PlayerId) -> TableResponse {
        self.request(|response| TableMessage::Leave {
            player_id,
            response,
        })
        .await
    }

    pub async fn submit(&self, player_id: PlayerId, action: PlayerAction) -> TableResponse {
        self.request(|response| TableMessage::Submit {
            player_id,
            action,
            response,
        })
        .await
    }

    pub async fn rebuy(&self, player_id: PlayerId, amount: Chips) -> TableResponse {
        self.request(|response| TableMessage::Rebuy {
            player_id,
            amount,
            response,
        })
        .await
    }

    pub async fn disconnect(&self, player_id: PlayerId) -> TableResponse {
        self.request(|response| TableMessage::Disconnect {
            player_id,
            response,
        })
        .await
    }

    pub async fn pause(&self) -> TableResponse {
        self.request(|response| TableMessage::Pause { response })
            .await
    }

    pub async fn resume(&self) -> TableResponse {
        self.request(|response| TableMessage::Resume { response })
            .await
    }

    pub async fn close(&self) -> TableResponse {
        self.request(|response| TableMessage::Close { response })
            .await
    }

    /// Advance the table clock by one second, independent of the timer.
    pub async fn tick(&self) -> Result<(), String> {
        self.send(TableMessage::Tick).await
    }

    /// Get the table as `viewer` sees it. `None` once the table is closed.
    pub async fn view(&self, viewer: Option<PlayerId>) -> Option<TableView> {
        let (response, reply) = oneshot::channel();
        self.send(TableMessage::GetView { viewer, response })
            .await
            .ok()?;
        reply.await.ok()
    }

    pub async fn state(&self) -> Option<TableStateResponse> {
        let (response, reply) = oneshot::channel();
        self.send(TableMessage::GetState { response }).await.ok()?;
        reply.await.ok()
    }

    /// Subscribe to the table's notifications.
    pub async fn subscribe(
        &self,
        player_id: PlayerId,
    ) -> Result<mpsc::Receiver<TableNotification>, String> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.send(TableMessage::Subscribe { player_id, sender })
            .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, player_id: PlayerId) -> Result<(), String> {
        self.send(TableMessage::Unsubscribe { player_id }).await
    }
}

/// Table actor managing a single poker table
pub struct TableActor {
    /// Table ID
    id: TableId,

    /// Hand lifecycle state
    table: PokerTable,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Where buy-ins are withdrawn from and payouts deposited
    custody: Arc<dyn CurrencyCustody>,

    /// Completed hand export, if enabled
    exporter: Option<ExportQueue>,

    /// Subscribers for table notifications
    subscribers: HashMap<PlayerId, mpsc::Sender<TableNotification>>,

    /// Table clock, running only while someone is seated
    ticker: Option<Interval>,

    /// Is table paused
    is_paused: bool,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `id` - Table ID
    /// * `config` - Table configuration
    /// * `custody` - Source of buy-ins and destination of payouts
    /// * `exporter` - Queue receiving completed hands
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(
        id: TableId,
        config: TableConfig,
        custody: Arc<dyn CurrencyCustody>,
        exporter: Option<ExportQueue>,
    ) -> (Self, TableHandle) {
        Self::with_table(id, PokerTable::new(config), custody, exporter)
    }

    /// Create an actor around an existing table, e.g. one with a fixed seed.
    pub fn with_table(
        id: TableId,
        table: PokerTable,
        custody: Arc<dyn CurrencyCustody>,
        exporter: Option<ExportQueue>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);

        let actor = Self {
            id,
            table,
            inbox,
            custody,
            exporter,
            subscribers: HashMap::new(),
            ticker: None,
            is_paused: false,
            is_closed: false,
        };

        let handle = TableHandle::new(sender, id);

        (actor, handle)
    }

    fn config(&self) -> &TableConfig {
        self.table.config()
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} '{}' starting", self.id, self.config().name);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        log::info!("Table {}: every handle dropped, closing", self.id);
                        self.close_table().await;
                        break;
                    };
                    self.handle_message(message).await;
                    self.after_change().await;

                    if self.is_closed {
                        break;
                    }
                }

                _ = next_tick(&mut self.ticker) => {
                    if !self.is_paused {
                        self.table.tick();
                        self.after_change().await;
                    }
                }
            }
        }

        log::info!("Table {} '{}' closed", self.id, self.config().name);
    }

    /// Handle a table message
    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join { request, response } => {
                let result = self.handle_join(request).await;
                let _ = response.send(result);
            }

            TableMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.handle_leave(player_id).await;
                let _ = response.send(result);
            }

            TableMessage::Submit {
                player_id,
                action,
                response,
            } => {
                let result = match self.table.submit(player_id, action) {
                    Ok(()) => TableResponse::Success,
                    Err(e) => e.into(),
                };
                let _ = response.send(result);
            }

            TableMessage::Rebuy {
                player_id,
                amount,
                response,
            } => {
                let result = match self.table.request_rebuy(player_id, amount) {
                    Ok(()) => TableResponse::Success,
                    Err(e) => e.into(),
                };
                let _ = response.send(result);
            }

            TableMessage::Disconnect {
                player_id,
                response,
            } => {
                let result = match self.table.mark_disconnected(player_id) {
                    Ok(()) => TableResponse::Success,
                    Err(e) => e.into(),
                };
                let _ = response.send(result);
            }

            TableMessage::GetView { viewer, response } => {
                let _ = response.send(self.table.view_for(viewer));
            }

            TableMessage::GetState { response } => {
                let _ = response.send(self.get_state());
            }

            TableMessage::Subscribe { player_id, sender } => {
                self.subscribers.insert(player_id, sender);
                self.table.add_viewer(player_id);
                log::debug!(
                    "Player {} subscribed to table {} notifications",
                    player_id,
                    self.id
                );
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                self.table.remove_viewer(player_id);
                log::debug!(
                    "Player {} unsubscribed from table {} notifications",
                    player_id,
                    self.id
                );
            }

            TableMessage::Tick => {
                if !self.is_paused {
                    self.table.tick();
                }
            }

            TableMessage::Pause { response } => {
                self.is_paused = true;
                log::info!("Table {} paused", self.id);
                let _ = response.send(TableResponse::Success);
            }

            TableMessage::Resume { response } => {
                self.is_paused = false;
                log::info!("Table {} resumed", self.id);
                let _ = response.send(TableResponse::Success);
            }

            TableMessage::Close { response } => {
                self.close_table().await;
                let _ = response.send(TableResponse::Success);
            }
        }
    }

    /// Handle join table request
    async fn handle_join(&mut self, request: JoinRequest) -> TableResponse {
        if let Err(e) = self.table.check_admission(&request, Utc::now()) {
            log::debug!(
                "Table {}: player {} declined: {}",
                self.id,
                request.player_id,
                e
            );
            return e.into();
        }

        match self
            .custody
            .withdraw(request.player_id, request.buy_in)
            .await
        {
            Ok(balance) => {
                log::debug!(
                    "Table {}: withdrew {} from player {}, balance {}",
                    self.id,
                    request.buy_in,
                    request.player_id,
                    balance
                );
            }
            Err(WalletError::InsufficientBalance {
                available,
                required,
            }) => {
                return TableResponse::InsufficientChips {
                    required,
                    available,
                };
            }
            Err(WalletError::WalletNotFound(_)) => {
                return JoinError::InsufficientFunds.into();
            }
            Err(e) => {
                log::error!(
                    "Table {}: buy-in withdrawal for player {} failed: {}",
                    self.id,
                    request.player_id,
                    e
                );
                return TableResponse::Error(e.client_message());
            }
        }

        self.table.seat_player(&request);
        TableResponse::Success
    }

    /// Handle leave table request
    async fn handle_leave(&mut self, player_id: PlayerId) -> TableResponse {
        match self.table.request_leave(player_id, Utc::now()) {
            Ok(Some(departure)) => {
                self.pay_out(vec![departure]).await;
                TableResponse::Success
            }
            Ok(None) => TableResponse::SuccessWithMessage(
                "You will leave the table at the end of this hand.".to_string(),
            ),
            Err(e) => e.into(),
        }
    }

    fn get_state(&self) -> TableStateResponse {
        TableStateResponse {
            table_id: self.id,
            table_name: self.config().name.clone(),
            player_count: self.table.players().len(),
            max_players: self.config().max_players,
            viewer_count: self.table.viewers().len(),
            small_blind: self.config().small_blind,
            big_blind: self.config().big_blind,
            pot_size: self.table.pots().iter().map(Pot::total).sum(),
            is_active: !self.is_paused,
            phase: self.table.state().to_string(),
            players: self
                .table
                .players()
                .iter()
                .map(|p| p.name.to_string())
                .collect(),
            hands_played: self.table.hands_played(),
        }
    }

    /// Pays everyone out and stops accepting messages.
    async fn close_table(&mut self) {
        let departures = self.table.dissolve(Utc::now());
        self.pay_out(departures).await;
        self.is_closed = true;
        self.after_change().await;
        self.subscribers.clear();
    }

    /// Flush everything the table produced since the last message or tick.
    async fn after_change(&mut self) {
        if self.table.take_settlement() {
            self.settle().await;
        }

        for hand in self.table.drain_completed() {
            let Some(exporter) = &self.exporter else {
                break;
            };
            if let Err(e) = exporter.enqueue(hand) {
                log::error!("Table {}: could not queue hand export: {}", self.id, e);
            }
        }

        for event in self.table.drain_events() {
            self.publish(event);
        }
        if self.table.take_view_changed() {
            self.notify(TableNotification::ViewChanged, None);
        }

        self.update_ticker();
    }

    /// Between hands: withdraw pending rebuys, then remove leaving players.
    async fn settle(&mut self) {
        for (player_id, amount) in self.table.take_rebuy_plans() {
            match self.custody.withdraw(player_id, amount).await {
                Ok(_) => self.table.credit_rebuy(player_id, amount),
                Err(e) => {
                    log::info!(
                        "Table {}: rebuy of {} for player {} failed: {}",
                        self.id,
                        amount,
                        player_id,
                        e
                    );
                    self.table.reject_rebuy(player_id);
                }
            }
        }

        let departures = self.table.process_leaves(Utc::now());
        self.pay_out(departures).await;
    }

    async fn pay_out(&self, departures: Vec<Departure>) {
        for departure in departures {
            if departure.payout == 0 {
                continue;
            }
            if let Err(e) = self
                .custody
                .deposit(departure.player_id, departure.payout)
                .await
            {
                log::error!(
                    "Table {}: failed to pay {} chips to player {} ({}): {}",
                    self.id,
                    departure.payout,
                    departure.player_id,
                    departure.name,
                    e
                );
            }
        }
    }

    fn publish(&mut self, event: TableEvent) {
        let recipient = event.recipient();
        self.notify(TableNotification::Event(event), recipient);
    }

    /// Send a notification to every subscriber, or only to `recipient`.
    fn notify(&mut self, notification: TableNotification, recipient: Option<PlayerId>) {
        self.subscribers.retain(|player_id, sender| {
            if recipient.is_some_and(|r| r != *player_id) {
                return true;
            }
            match sender.try_send(notification.clone()) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping notification",
                        player_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", player_id);
                    false
                }
            }
        });
    }

    /// Start the clock when the first player sits, stop it when the last
    /// one leaves.
    fn update_ticker(&mut self) {
        let seated = !self.table.is_empty() && !self.is_closed;
        match (&self.ticker, seated) {
            (None, true) => {
                let period = self.config().tick_period();
                self.ticker = Some(interval_at(Instant::now() + period, period));
                log::debug!("Table {}: clock started", self.id);
            }
            (Some(_), false) => {
                self.ticker = None;
                log::debug!("Table {}: clock stopped", self.id);
            }
            _ => {}
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
