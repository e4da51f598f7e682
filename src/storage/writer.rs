//! Ordered background persistence
//!
//! Session mutations happen synchronously in memory; the resulting snapshot
//! is handed to a [`PersistenceWriter`], which applies writes on a single
//! background task in submission order. Snapshots still queued when a newer
//! one arrives are skipped, so the stored value is always the newest state
//! and an older write can never land after a newer one.

use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum WriteCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget writer for full-state snapshots
///
/// When created outside a tokio runtime there is no task to hand writes to,
/// and snapshots are written inline instead.
pub struct PersistenceWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    tx: Option<mpsc::UnboundedSender<WriteCommand>>,
}

impl PersistenceWriter {
    /// Start a writer for `key` on the current tokio runtime
    ///
    /// # Examples
    ///
    /// ```
    /// use chatpad::storage::{KeyValueStore, MemoryStore, PersistenceWriter};
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let store = Arc::new(MemoryStore::new());
    /// let writer = PersistenceWriter::spawn(store.clone(), "state");
    /// writer.submit("v1".to_string());
    /// writer.submit("v2".to_string());
    /// writer.flush().await;
    /// assert_eq!(store.get("state").unwrap(), Some("v2".to_string()));
    /// # }
    /// ```
    pub fn spawn(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();

        let tx = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (tx, rx) = mpsc::unbounded_channel();
                handle.spawn(run_writer(storage.clone(), key.clone(), rx));
                Some(tx)
            }
            Err(_) => {
                tracing::debug!("No tokio runtime available, persisting '{}' inline", key);
                None
            }
        };

        Self { storage, key, tx }
    }

    /// Queue a snapshot for writing
    ///
    /// Never blocks on I/O when a runtime is available. Failures are logged.
    pub fn submit(&self, snapshot: String) {
        match &self.tx {
            Some(tx) => {
                if let Err(mpsc::error::SendError(WriteCommand::Save(snapshot))) =
                    tx.send(WriteCommand::Save(snapshot))
                {
                    tracing::warn!("Persistence task stopped, writing '{}' inline", self.key);
                    write_snapshot(self.storage.as_ref(), &self.key, &snapshot);
                }
            }
            None => write_snapshot(self.storage.as_ref(), &self.key, &snapshot),
        }
    }

    /// Wait until every snapshot submitted before this call has been written
    pub async fn flush(&self) {
        if let Some(tx) = &self.tx {
            let (done_tx, done_rx) = oneshot::channel();
            if tx.send(WriteCommand::Flush(done_tx)).is_ok() {
                let _ = done_rx.await;
            }
        }
    }

    /// Storage key this writer persists under
    pub fn key(&self) -> &str {
        &self.key
    }
}

async fn run_writer(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();

        collect(command, &mut latest, &mut waiters);
        while let Ok(command) = rx.try_recv() {
            collect(command, &mut latest, &mut waiters);
        }

        if let Some(snapshot) = latest {
            let storage = storage.clone();
            let key = key.clone();
            let result = tokio::task::spawn_blocking(move || {
                write_snapshot(storage.as_ref(), &key, &snapshot)
            })
            .await;
            if let Err(e) = result {
                tracing::error!("Persistence write task failed: {}", e);
            }
        }

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    tracing::debug!("Persistence writer for '{}' stopped", key);
}

fn collect(
    command: WriteCommand,
    latest: &mut Option<String>,
    waiters: &mut Vec<oneshot::Sender<()>>,
) {
    match command {
        WriteCommand::Save(snapshot) => {
            if latest.replace(snapshot).is_some() {
                tracing::trace!("Skipping superseded snapshot");
            }
        }
        WriteCommand::Flush(waiter) => waiters.push(waiter),
    }
}

fn write_snapshot(storage: &dyn KeyValueStore, key: &str, snapshot: &str) {
    match storage.set(key, snapshot) {
        Ok(()) => tracing::debug!("Persisted {} bytes under '{}'", snapshot.len(), key),
        Err(e) => tracing::error!("Failed to persist '{}': {}", key, e),
    }
}
