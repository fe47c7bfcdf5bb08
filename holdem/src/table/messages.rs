//! Table actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::TableId;
use crate::game::{
    admission::JoinRequest,
    entities::{Chips, PlayerAction, PlayerId},
    errors::{ActionError, JoinError},
    events::TableEvent,
    view::TableView,
};

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Join table request
    Join {
        request: JoinRequest,
        response: oneshot::Sender<TableResponse>,
    },

    /// Leave now, or at the end of the running hand
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Player action (bet, raise, call, check, fold, all-in)
    Submit {
        player_id: PlayerId,
        action: PlayerAction,
        response: oneshot::Sender<TableResponse>,
    },

    /// Request more chips, withdrawn when the hand ends
    Rebuy {
        player_id: PlayerId,
        amount: Chips,
        response: oneshot::Sender<TableResponse>,
    },

    /// The host lost the player's connection
    Disconnect {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get the table as seen by `viewer`
    GetView {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<TableView>,
    },

    /// Get current table summary
    GetState {
        response: oneshot::Sender<TableStateResponse>,
    },

    /// Subscribe to table notifications. Non-seated subscribers become
    /// viewers.
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<TableNotification>,
    },

    /// Unsubscribe from table notifications
    Unsubscribe { player_id: PlayerId },

    /// Advance the table clock by one second
    Tick,

    /// Pause table (admin only)
    Pause {
        response: oneshot::Sender<TableResponse>,
    },

    /// Resume table (admin only)
    Resume {
        response: oneshot::Sender<TableResponse>,
    },

    /// Close table (admin only). Pays out every seated player.
    Close {
        response: oneshot::Sender<TableResponse>,
    },
}

/// Notification pushed to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum TableNotification {
    /// Something happened at the table
    Event(TableEvent),
    /// The table view changed and should be fetched again
    ViewChanged,
}

/// Response from table operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResponse {
    /// Operation succeeded
    Success,

    /// Operation succeeded with message
    SuccessWithMessage(String),

    /// Operation failed
    Error(String),

    /// Table is full
    TableFull,

    /// Insufficient funds for the buy-in
    InsufficientChips { required: i64, available: i64 },

    /// Invalid action for current game state
    InvalidAction(String),

    /// Join request declined
    JoinDeclined(String),

    /// Player not at table
    NotAtTable,

    /// Table no longer accepts requests
    TableClosed,
}

/// Table state response
#[derive(Debug, Clone, Serialize)]
pub struct TableStateResponse {
    pub table_id: TableId,
    pub table_name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub viewer_count: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Chips in unsettled pots
    pub pot_size: Chips,
    /// Is table active (not paused)
    pub is_active: bool,
    /// Current hand state
    pub phase: String,
    pub players: Vec<String>,
    pub hands_played: u64,
}

impl TableResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TableResponse::Success | TableResponse::SuccessWithMessage(_)
        )
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            TableResponse::Error(msg)
            | TableResponse::InvalidAction(msg)
            | TableResponse::JoinDeclined(msg) => Some(msg.clone()),
            TableResponse::TableFull => Some(JoinError::TableFull.to_string()),
            TableResponse::InsufficientChips {
                required,
                available,
            } => Some(format!(
                "{} (need {required}, have {available})",
                JoinError::InsufficientFunds
            )),
            TableResponse::NotAtTable => Some(ActionError::NotSeated.to_string()),
            TableResponse::TableClosed => Some("Table is closed".to_string()),
            TableResponse::Success | TableResponse::SuccessWithMessage(_) => None,
        }
    }
}

impl From<ActionError> for TableResponse {
    fn from(error: ActionError) -> Self {
        match error {
            ActionError::NotSeated => TableResponse::NotAtTable,
            other => TableResponse::InvalidAction(other.to_string()),
        }
    }
}

impl From<JoinError> for TableResponse {
    fn from(error: JoinError) -> Self {
        match error {
            JoinError::TableFull => TableResponse::TableFull,
            other => TableResponse::JoinDeclined(other.to_string()),
        }
    }
}
