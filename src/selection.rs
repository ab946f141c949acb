//! The user's selected document.
//!
//! Selection is held by id, not by value. It is resolved against the
//! registry's current snapshot on every read, so a refresh that drops the
//! document makes the selection resolve to `None` without anyone touching it.
//! With [`MissingSelection::Clear`], [`Selection::reconcile`] also forgets
//! the dangling id.

use std::sync::Mutex;
use tracing::debug;

use crate::config::MissingSelection;
use crate::models::Document;
use crate::registry::DocumentRegistry;

pub struct Selection {
    policy: MissingSelection,
    selected: Mutex<Option<String>>,
}

impl Selection {
    pub fn new(policy: MissingSelection) -> Self {
        Self {
            policy,
            selected: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> MissingSelection {
        self.policy
    }

    pub fn select(&self, id: impl Into<String>) {
        *self.lock() = Some(id.into());
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// The stored id, dangling or not.
    pub fn selected_id(&self) -> Option<String> {
        self.lock().clone()
    }

    /// The selected document as it appears in the current snapshot.
    pub fn resolve(&self, registry: &DocumentRegistry) -> Option<Document> {
        let id = self.selected_id()?;
        registry.get(&id)
    }

    /// Apply the missing-document policy after a refresh. Returns true when
    /// a dangling id was dropped.
    pub fn reconcile(&self, registry: &DocumentRegistry) -> bool {
        if self.policy != MissingSelection::Clear {
            return false;
        }
        let mut selected = self.lock();
        let dangling = matches!(selected.as_deref(), Some(id) if !registry.contains(id));
        if dangling {
            debug!(id = ?selected.as_deref(), "selected document vanished; clearing selection");
            *selected = None;
        }
        dangling
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.selected.lock().unwrap_or_else(|e| e.into_inner())
    }
}
