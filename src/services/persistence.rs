//! Debounced snapshot persistence.
//!
//! The engine never performs I/O inline: store mutations schedule a snapshot
//! write and continue. A worker task coalesces rapid successive writes to the
//! same store into one repository save per debounce window (default ~3s).
//! Scheduling is fire-and-forget; `flush` forces the pending writes out and
//! is awaited on visibility loss or shutdown. Only the persistence timer is
//! ever cancelled; propagation is synchronous and already complete by the
//! time a write runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::snapshot_repository::{SnapshotRepository, StoreKind};

enum Command {
    Write { kind: StoreKind, payload: String },
    Flush { ack: oneshot::Sender<()> },
    Shutdown { ack: oneshot::Sender<()> },
}

/// Cheap, clonable handle to the persistence worker.
#[derive(Clone)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistenceHandle {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(repository: Arc<dyn SnapshotRepository>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker(repository, debounce, rx));
        Self { tx }
    }

    /// Queue a snapshot write. Coalesces with other writes to the same store
    /// within the debounce window. Never blocks and never fails the caller.
    pub fn schedule(&self, kind: StoreKind, payload: String) {
        if self
            .tx
            .send(Command::Write { kind, payload })
            .is_err()
        {
            tracing::warn!(store = %kind, "persistence worker gone, dropping snapshot");
        }
    }

    /// Cancel the debounce timer and write everything pending now.
    pub async fn flush(&self) -> DomainResult<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Flush { ack })
            .map_err(|_| DomainError::PersistenceUnavailable("worker stopped".to_string()))?;
        done.await
            .map_err(|_| DomainError::PersistenceUnavailable("worker stopped".to_string()))
    }

    /// Flush and stop the worker.
    pub async fn shutdown(&self) -> DomainResult<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Shutdown { ack })
            .map_err(|_| DomainError::PersistenceUnavailable("worker stopped".to_string()))?;
        done.await
            .map_err(|_| DomainError::PersistenceUnavailable("worker stopped".to_string()))
    }
}

async fn worker(
    repository: Arc<dyn SnapshotRepository>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: HashMap<StoreKind, String> = HashMap::new();
    let mut deadline: Option<Instant> = None;

    loop {
        // An idle worker parks on the channel alone; the far-future deadline
        // only exists to keep select! well-formed.
        let wake = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Write { kind, payload }) => {
                    pending.insert(kind, payload);
                    deadline.get_or_insert_with(|| Instant::now() + debounce);
                }
                Some(Command::Flush { ack }) => {
                    write_pending(repository.as_ref(), &mut pending).await;
                    deadline = None;
                    let _ = ack.send(());
                }
                Some(Command::Shutdown { ack }) => {
                    write_pending(repository.as_ref(), &mut pending).await;
                    let _ = ack.send(());
                    return;
                }
                None => {
                    // All handles dropped: final write, then stop.
                    write_pending(repository.as_ref(), &mut pending).await;
                    return;
                }
            },
            () = time::sleep_until(wake), if deadline.is_some() => {
                write_pending(repository.as_ref(), &mut pending).await;
                deadline = None;
            }
        }
    }
}

async fn write_pending(
    repository: &dyn SnapshotRepository,
    pending: &mut HashMap<StoreKind, String>,
) {
    for (kind, payload) in pending.drain() {
        if let Err(err) = repository.save(kind, &payload).await {
            tracing::warn!(store = %kind, error = %err, "snapshot write failed");
        } else {
            tracing::debug!(store = %kind, bytes = payload.len(), "snapshot written");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::snapshot_repository::InMemorySnapshotRepository;

    #[tokio::test]
    async fn test_flush_writes_pending_immediately() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let handle = PersistenceHandle::spawn(repo.clone(), Duration::from_secs(3600));

        handle.schedule(StoreKind::Flight, "{\"v\":1}".to_string());
        handle.flush().await.unwrap();

        assert_eq!(
            repo.load(StoreKind::Flight).await.unwrap().as_deref(),
            Some("{\"v\":1}")
        );
    }

    #[tokio::test]
    async fn test_debounce_coalesces_rapid_writes() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let handle = PersistenceHandle::spawn(repo.clone(), Duration::from_millis(50));

        handle.schedule(StoreKind::Flight, "first".to_string());
        handle.schedule(StoreKind::Flight, "second".to_string());
        handle.schedule(StoreKind::Flight, "third".to_string());

        // Nothing lands before the window closes.
        assert!(repo.load(StoreKind::Flight).await.unwrap().is_none());

        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            repo.load(StoreKind::Flight).await.unwrap().as_deref(),
            Some("third"),
            "only the last write in the window survives"
        );
    }

    #[tokio::test]
    async fn test_shutdown_flushes() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let handle = PersistenceHandle::spawn(repo.clone(), Duration::from_secs(3600));

        handle.schedule(StoreKind::Traveler, "final".to_string());
        handle.shutdown().await.unwrap();

        assert_eq!(
            repo.load(StoreKind::Traveler).await.unwrap().as_deref(),
            Some("final")
        );
    }
}
