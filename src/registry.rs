//! Locally cached snapshot of the server's document collection.
//!
//! A refresh replaces the whole list on success and leaves it untouched on
//! failure. Fetches never overlap. [`DocumentRegistry::refresh`] is the poll
//! path: it is skipped while another fetch is outstanding.
//! [`DocumentRegistry::refresh_now`] is the user-action path: it waits for
//! the outstanding fetch and then fetches again, so changes committed after
//! that fetch started are always picked up.
//!
//! Observers can [`subscribe`](DocumentRegistry::subscribe) to a generation
//! counter that advances on every successful replace.

use std::sync::{Arc, RwLock};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::client::Backend;
use crate::models::Document;

/// Result of one refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cached list was replaced with `count` documents.
    Updated { count: usize },
    /// Another fetch was still in flight; nothing was requested.
    /// Only [`DocumentRegistry::refresh`] returns this.
    Skipped,
    /// The request failed; the previous snapshot is kept.
    Failed,
}

#[derive(Debug, Default)]
struct Snapshot {
    documents: Vec<Document>,
    generation: u64,
    /// `None` until the first refresh completes.
    online: Option<bool>,
}

pub struct DocumentRegistry {
    backend: Arc<dyn Backend>,
    state: RwLock<Snapshot>,
    /// Held for the duration of one fetch.
    fetch_lock: Mutex<()>,
    generation_tx: watch::Sender<u64>,
}

impl DocumentRegistry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (generation_tx, _) = watch::channel(0);
        Self {
            backend,
            state: RwLock::new(Snapshot::default()),
            fetch_lock: Mutex::new(()),
            generation_tx,
        }
    }

    /// Poll refresh: fetch the full collection unless a fetch is already
    /// outstanding, in which case nothing is requested.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_fetching) = self.fetch_lock.try_lock() else {
            debug!("refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };
        self.fetch().await
    }

    /// Forced refresh: wait for any outstanding fetch, then fetch again.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let _fetching = self.fetch_lock.lock().await;
        self.fetch().await
    }

    async fn fetch(&self) -> RefreshOutcome {
        match self.backend.list_documents().await {
            Ok(documents) => {
                let count = documents.len();
                let generation = {
                    let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                    state.documents = documents;
                    state.generation += 1;
                    state.online = Some(true);
                    state.generation
                };
                self.generation_tx.send_replace(generation);
                info!(count, generation, "document list refreshed");
                RefreshOutcome::Updated { count }
            }
            Err(e) => {
                warn!(error = %e, "document refresh failed; keeping previous list");
                self.state
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .online = Some(false);
                RefreshOutcome::Failed
            }
        }
    }

    /// Copy of the current cached list, in server order.
    pub fn documents(&self) -> Vec<Document> {
        self.read(|s| s.documents.clone())
    }

    /// Look up a cached document by id.
    pub fn get(&self, id: &str) -> Option<Document> {
        self.read(|s| s.documents.iter().find(|d| d.id == id).cloned())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read(|s| s.documents.iter().any(|d| d.id == id))
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.documents.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful replacements so far.
    pub fn generation(&self) -> u64 {
        self.read(|s| s.generation)
    }

    /// Whether the most recent completed refresh succeeded.
    pub fn is_online(&self) -> bool {
        self.read(|s| s.online == Some(true))
    }

    pub fn is_refreshing(&self) -> bool {
        self.fetch_lock.try_lock().is_err()
    }

    /// Receiver that changes whenever the list is replaced.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }
}
