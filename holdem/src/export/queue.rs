//! Background delivery of completed hands.
//!
//! The table hands finished hands to [`ExportQueue::enqueue`], which never
//! blocks. A worker task delivers them to the sink in order, retrying
//! failures with exponential backoff until the [`RetryPolicy`] gives up.

use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

use super::{ExportError, records::CompletedHand, sink::ExportSink};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per hand before it is dropped; `None` retries forever.
    pub max_attempts: Option<u32>,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(10),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn gives_up_after(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

/// Totals reported by the worker once the queue shuts down.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExportStats {
    pub delivered: usize,
    pub dropped: usize,
    pub retries: usize,
}

#[derive(Clone, Debug)]
pub struct ExportQueue {
    sender: mpsc::UnboundedSender<CompletedHand>,
}

impl ExportQueue {
    /// Starts the worker on the current runtime. The worker stops once
    /// every clone of the queue is dropped and the backlog is delivered.
    pub fn spawn(sink: Arc<dyn ExportSink>, policy: RetryPolicy) -> (Self, JoinHandle<ExportStats>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver, sink, policy));
        (Self { sender }, worker)
    }

    pub fn enqueue(&self, hand: CompletedHand) -> Result<(), ExportError> {
        self.sender.send(hand).map_err(|_| ExportError::Closed)
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<CompletedHand>,
    sink: Arc<dyn ExportSink>,
    policy: RetryPolicy,
) -> ExportStats {
    let mut stats = ExportStats::default();
    while let Some(hand) = receiver.recv().await {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match sink.export(&hand).await {
                Ok(()) => {
                    log::debug!("Exported hand {}", hand.hand_id());
                    stats.delivered += 1;
                    break;
                }
                Err(e) if policy.gives_up_after(attempt) => {
                    log::error!(
                        "Dropping hand {} after {attempt} failed exports: {e}",
                        hand.hand_id()
                    );
                    stats.dropped += 1;
                    break;
                }
                Err(e) => {
                    let delay = policy.backoff(attempt);
                    log::warn!(
                        "Export of hand {} failed (attempt {attempt}), retrying in {delay:?}: {e}",
                        hand.hand_id()
                    );
                    stats.retries += 1;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    log::info!(
        "Export queue stopped: {} delivered, {} dropped",
        stats.delivered,
        stats.dropped
    );
    stats
}
