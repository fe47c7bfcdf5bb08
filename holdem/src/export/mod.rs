//! Hand export: records of completed hands and their delivery.
//!
//! Exporting is fire-and-forget from the table's point of view. Nothing in
//! this module can delay or fail a hand.

use thiserror::Error;

pub mod queue;
pub mod records;
pub mod sink;

pub use queue::{ExportQueue, ExportStats, RetryPolicy};
pub use records::{ActionRecord, CompletedHand, HandRecord, PlayerResult};
pub use sink::{ExportSink, JsonLinesSink, MemorySink};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export rejected: {0}")]
    Rejected(String),

    #[error("Export queue is closed")]
    Closed,
}
