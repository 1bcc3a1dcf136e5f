//! Bounded, batched audit log sink.
//!
//! A single background drainer receives entries over a bounded channel,
//! batches them up to a configured size or flushes on a ticker, and writes
//! each batch as one bulk call to the backing [`AuditStore`]. When the
//! channel is full the caller falls back to a synchronous single-entry
//! write rather than blocking the hot path waiting for channel capacity.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("audit store write failed: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub run_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(run_id: impl Into<String>, event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), run_id: run_id.into(), event_type: event_type.into(), payload, recorded_at: Utc::now() }
    }
}

/// Backing store for audit batches. A bulk insert that ignores duplicate
/// ids so a synchronous fallback write racing with a batched one is safe.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<()>;
}

/// In-memory store, primarily for tests and for small single-process runs
/// that don't need external persistence.
#[derive(Default)]
pub struct InMemoryStore {
    entries: std::sync::Mutex<Vec<AuditEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<()> {
        let mut guard = self.entries.lock().expect("store mutex poisoned");
        let seen: std::collections::HashSet<&str> = guard.iter().map(|e| e.id.as_str()).collect();
        for entry in entries {
            if !seen.contains(entry.id.as_str()) {
                guard.push(entry.clone());
            }
        }
        Ok(())
    }
}

enum Command {
    Entry(AuditEntry),
}

/// Handle to the audit sink. Cheap to clone; every clone shares the same
/// background drainer and channel.
#[derive(Clone)]
pub struct AuditLog {
    sender: mpsc::Sender<Command>,
    store: Arc<dyn AuditStore>,
}

pub struct AuditLogHandle {
    pub sink: AuditLog,
    drainer: JoinHandle<()>,
}

impl AuditLog {
    /// Spawn the background drainer. `buffer_size` bounds both the batch
    /// size and (doubled) the channel capacity.
    pub fn spawn(store: Arc<dyn AuditStore>, buffer_size: usize, flush_interval: Duration) -> AuditLogHandle {
        let channel_capacity = buffer_size.max(1) * 2;
        let (sender, receiver) = mpsc::channel(channel_capacity);
        let sink = AuditLog { sender, store: store.clone() };
        let drainer = tokio::spawn(drain_loop(receiver, store, buffer_size.max(1), flush_interval));
        AuditLogHandle { sink, drainer }
    }

    /// Log an entry. If the channel is full, falls back to a synchronous
    /// single-entry write so the caller is never blocked indefinitely.
    pub async fn log(&self, entry: AuditEntry) -> Result<()> {
        match self.sender.try_send(Command::Entry(entry.clone())) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(entry_id = %entry.id, "audit channel full, writing synchronously");
                self.store.write_batch(std::slice::from_ref(&entry)).await
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(Error::Store("audit sink has been shut down".to_string())),
        }
    }

    /// Write directly to the store, bypassing the channel and batching
    /// entirely, for callers that must guarantee persistence before
    /// proceeding.
    pub async fn log_sync(&self, entry: AuditEntry) -> Result<()> {
        self.store.write_batch(std::slice::from_ref(&entry)).await
    }
}

impl AuditLogHandle {
    /// Close the channel, wait for the drainer to flush everything
    /// buffered, then return.
    pub async fn shutdown(self) {
        drop(self.sink.sender);
        let _ = self.drainer.await;
    }
}

async fn drain_loop(mut receiver: mpsc::Receiver<Command>, store: Arc<dyn AuditStore>, buffer_size: usize, flush_interval: Duration) {
    let mut batch = Vec::with_capacity(buffer_size);
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            maybe_cmd = receiver.recv() => {
                match maybe_cmd {
                    Some(Command::Entry(entry)) => {
                        batch.push(entry);
                        if batch.len() >= buffer_size {
                            flush(&store, &mut batch).await;
                        }
                    }
                    None => {
                        // Drain whatever is still queued without blocking further.
                        while let Ok(Command::Entry(entry)) = receiver.try_recv() {
                            batch.push(entry);
                        }
                        flush(&store, &mut batch).await;
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                flush(&store, &mut batch).await;
            }
        }
    }
}

async fn flush(store: &Arc<dyn AuditStore>, batch: &mut Vec<AuditEntry>) {
    if batch.is_empty() {
        return;
    }
    if let Err(e) = store.write_batch(batch).await {
        tracing::error!(error = %e, count = batch.len(), "failed to flush audit batch");
    }
    batch.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(run_id: &str, kind: &str) -> AuditEntry {
        AuditEntry::new(run_id, kind, serde_json::json!({"k": "v"}))
    }

    #[tokio::test]
    async fn batches_flush_on_ticker_interval() {
        let store = Arc::new(InMemoryStore::new());
        let handle = AuditLog::spawn(store.clone(), 100, Duration::from_millis(20));
        handle.sink.log(entry("run1", "page_analyzed")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.snapshot().len(), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn batches_flush_once_buffer_size_is_reached() {
        let store = Arc::new(InMemoryStore::new());
        let handle = AuditLog::spawn(store.clone(), 3, Duration::from_secs(60));
        for i in 0..3 {
            handle.sink.log(entry("run1", &format!("event{i}"))).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.snapshot().len(), 3);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_drains_remaining_entries() {
        let store = Arc::new(InMemoryStore::new());
        let handle = AuditLog::spawn(store.clone(), 100, Duration::from_secs(60));
        handle.sink.log(entry("run1", "a")).await.unwrap();
        handle.sink.log(entry("run1", "b")).await.unwrap();
        handle.shutdown().await;
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn log_sync_writes_immediately_without_the_channel() {
        let store = Arc::new(InMemoryStore::new());
        let handle = AuditLog::spawn(store.clone(), 100, Duration::from_secs(60));
        handle.sink.log_sync(entry("run1", "critical")).await.unwrap();
        assert_eq!(store.snapshot().len(), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn duplicate_ids_are_ignored_by_the_store() {
        let store = Arc::new(InMemoryStore::new());
        let e = entry("run1", "dup");
        store.write_batch(&[e.clone(), e.clone()]).await.unwrap();
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn full_channel_falls_back_to_synchronous_write() {
        let store = Arc::new(InMemoryStore::new());
        // Buffer size 1 means channel capacity 2; spawn without driving the
        // drainer by using a very long flush interval and immediately
        // saturating the channel before the drainer's first select! poll.
        let handle = AuditLog::spawn(store.clone(), 1, Duration::from_secs(3600));
        for i in 0..5 {
            handle.sink.log(entry("run1", &format!("e{i}"))).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Every entry reaches the store one way or another: batched or sync.
        assert_eq!(store.snapshot().len(), 5);
        handle.shutdown().await;
    }
}
