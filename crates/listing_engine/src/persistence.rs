use std::sync::Arc;

use listing_core::{PersistedFilterPatch, PersistedFilterState};
use listing_logging::{listing_debug, listing_info, listing_warn};
use tokio::sync::{mpsc, oneshot};

use crate::storage::{KeyValueStore, PersistError};

/// Reads and writes filter snapshots under one namespace key.
///
/// Failures never escape: a failed read yields `None`, a failed write is logged
/// and the filters stay usable in memory.
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn save(&self, state: &PersistedFilterState) {
        if let Err(err) = self.try_save(state).await {
            listing_warn!("Failed to persist filters under {:?}: {}", self.key, err);
        }
    }

    async fn try_save(&self, state: &PersistedFilterState) -> Result<(), PersistError> {
        let content = serde_json::to_string(state)?;
        self.store.set(&self.key, &content).await
    }

    pub async fn load(&self) -> Option<PersistedFilterPatch> {
        let content = match self.store.get(&self.key).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                listing_debug!("No persisted filters under {:?}", self.key);
                return None;
            }
            Err(err) => {
                listing_warn!("Failed to read persisted filters {:?}: {}", self.key, err);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(patch) => {
                listing_info!("Loaded persisted filters from {:?}", self.key);
                Some(patch)
            }
            Err(err) => {
                listing_warn!("Failed to parse persisted filters {:?}: {}", self.key, err);
                None
            }
        }
    }
}

enum PersistCommand {
    Save(PersistedFilterState),
    Flush(oneshot::Sender<()>),
}

/// Handle to the single task that writes snapshots in submission order.
#[derive(Clone)]
pub struct PersistenceHandle {
    cmd_tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceHandle {
    /// Spawns the writer task on the current tokio runtime.
    pub fn spawn(adapter: PersistenceAdapter) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(adapter, cmd_rx));
        Self { cmd_tx }
    }

    /// Queues a snapshot without waiting for the write.
    pub fn save(&self, state: PersistedFilterState) {
        if self.cmd_tx.send(PersistCommand::Save(state)).is_err() {
            listing_debug!("Persistence writer stopped; snapshot kept in memory only");
        }
    }

    /// Resolves once every snapshot queued before this call has been written.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.cmd_tx.send(PersistCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_writer(adapter: PersistenceAdapter, mut cmd_rx: mpsc::UnboundedReceiver<PersistCommand>) {
    let mut pending: Option<PersistedFilterState> = None;
    while let Some(command) = cmd_rx.recv().await {
        let mut flushes = Vec::new();
        absorb(command, &mut pending, &mut flushes);
        // Coalesce whatever queued up meanwhile; only the newest snapshot matters.
        while let Ok(command) = cmd_rx.try_recv() {
            absorb(command, &mut pending, &mut flushes);
        }
        if let Some(state) = pending.take() {
            adapter.save(&state).await;
        }
        for done in flushes {
            let _ = done.send(());
        }
    }
    listing_debug!("Persistence writer for {:?} stopped", adapter.key());
}

fn absorb(
    command: PersistCommand,
    pending: &mut Option<PersistedFilterState>,
    flushes: &mut Vec<oneshot::Sender<()>>,
) {
    match command {
        PersistCommand::Save(state) => *pending = Some(state),
        PersistCommand::Flush(done) => flushes.push(done),
    }
}
