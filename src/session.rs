//! The dashboard session: every component plus its lifecycle.
//!
//! A [`DashboardSession`] is created when the view mounts and dropped when
//! it unmounts. [`start`](DashboardSession::start) begins polling;
//! [`shutdown`](DashboardSession::shutdown) or drop cancels the poll timer.
//! Uploads and queries in flight belong to their callers and are not
//! cancelled by shutdown.
//!
//! ```rust,no_run
//! use ragdesk::config::Config;
//! use ragdesk::session::DashboardSession;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut session = DashboardSession::connect(Config::minimal())?;
//! session.start();
//! session.queries().ask("How did revenue do?").await;
//! session.shutdown();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::info;

use crate::client::{Backend, HttpBackend};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::Document;
use crate::poller::{spawn_poller, PollHandle};
use crate::query::QuerySession;
use crate::registry::{DocumentRegistry, RefreshOutcome};
use crate::selection::Selection;
use crate::upload::UploadCoordinator;

pub struct DashboardSession {
    config: Config,
    registry: Arc<DocumentRegistry>,
    uploads: UploadCoordinator,
    queries: QuerySession,
    selection: Selection,
    poller: Option<PollHandle>,
}

impl DashboardSession {
    /// Build a session over any backend. Polling does not start until
    /// [`start`](Self::start).
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        let registry = Arc::new(DocumentRegistry::new(backend.clone()));
        let uploads = UploadCoordinator::new(backend.clone(), registry.clone());
        let queries = QuerySession::new(backend, &config.query);
        let selection = Selection::new(config.selection.on_missing);

        Self {
            config,
            registry,
            uploads,
            queries,
            selection,
            poller: None,
        }
    }

    /// Build a session over HTTP using `config.backend`.
    pub fn connect(config: Config) -> ClientResult<Self> {
        let backend = HttpBackend::new(&config.backend)?;
        info!(base_url = backend.base_url(), "connecting");
        Ok(Self::new(config, Arc::new(backend)))
    }

    /// Start polling. Calling it again while running is a no-op.
    pub fn start(&mut self) {
        if self.is_polling() {
            return;
        }
        self.poller = Some(spawn_poller(
            self.registry.clone(),
            self.config.poll_interval(),
        ));
    }

    /// Cancel the poll timer.
    pub fn shutdown(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            info!("session shut down");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_running)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DocumentRegistry> {
        &self.registry
    }

    pub fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    pub fn queries(&self) -> &QuerySession {
        &self.queries
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Refresh now, outside the poll schedule.
    pub async fn refresh(&self) -> RefreshOutcome {
        let outcome = self.registry.refresh_now().await;
        self.selection.reconcile(&self.registry);
        outcome
    }

    /// The selected document in the current snapshot, after applying the
    /// missing-selection policy.
    pub fn selected_document(&self) -> Option<Document> {
        self.selection.reconcile(&self.registry);
        self.selection.resolve(&self.registry)
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
