//! Destinations for completed hands.

use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use super::{ExportError, records::CompletedHand};

#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Stores one completed hand. Called again with the same hand after a
    /// failure, so implementations should tolerate duplicates.
    async fn export(&self, hand: &CompletedHand) -> Result<(), ExportError>;
}

/// Appends each hand as one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ExportSink for JsonLinesSink {
    async fn export(&self, hand: &CompletedHand) -> Result<(), ExportError> {
        let mut line = serde_json::to_vec(hand)?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Keeps hands in memory. Can be told to fail a number of times first.
#[derive(Debug, Default)]
pub struct MemorySink {
    hands: Mutex<Vec<CompletedHand>>,
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose first `failures` exports are rejected.
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub async fn hands(&self) -> Vec<CompletedHand> {
        self.hands.lock().await.clone()
    }

    /// Every call to [`ExportSink::export`], failed or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn export(&self, hand: &CompletedHand) -> Result<(), ExportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ExportError::Rejected("sink unavailable".to_string()));
        }
        self.hands.lock().await.push(hand.clone());
        Ok(())
    }
}
