//! Registry of session graphs and the active-session pointer.
//!
//! Per session id the registry moves through
//! `Absent -> Present (inactive) -> Present (active) -> Absent`.
//!
//! The map and the active pointer live under one [`RwLock`]. Every write
//! updates both in a single critical section, so a reader can never see an
//! active id whose graph was already released.

use std::{collections::HashMap, sync::Arc};

use prism_core::{CancellationToken, DesyncReport};
use tokio::sync::{RwLock, mpsc};

use crate::{Session, SessionConfig, SessionGraph, SessionId};

#[derive(Debug, Default)]
struct RegistryState {
    graphs: HashMap<SessionId, Arc<SessionGraph>>,
    /// Always a key of `graphs` when set.
    active: Option<SessionId>,
}

/// Owner of every session graph.
#[derive(Debug)]
pub struct SessionRegistry {
    config: SessionConfig,
    root: CancellationToken,
    reports: Option<mpsc::UnboundedSender<DesyncReport>>,
    state: RwLock<RegistryState>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            root: CancellationToken::new(),
            reports: None,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Create an empty registry forwarding every desync of every graph to
    /// `reports`.
    pub fn with_reports(
        config: SessionConfig,
        reports: mpsc::UnboundedSender<DesyncReport>,
    ) -> Self {
        let mut registry = Self::new(config);
        registry.reports = Some(reports);
        registry
    }

    /// Build and register a graph for `session` and make it active.
    ///
    /// A graph already registered under the same id is closed and replaced.
    /// Must be called from within a Tokio runtime.
    pub async fn create(&self, session: Session) -> Arc<SessionGraph> {
        let id = session.id().clone();
        let graph = Arc::new(SessionGraph::new(
            session,
            self.config.clone(),
            &self.root,
            self.reports.clone(),
        ));

        let mut state = self.state.write().await;
        if let Some(previous) = state.graphs.insert(id.clone(), Arc::clone(&graph)) {
            previous.close();
            tracing::info!(session_id = %id, "session graph replaced");
        } else {
            tracing::info!(session_id = %id, "session created");
        }
        Self::activate(&mut state, &id);
        graph
    }

    /// Point the active pointer at `id`.
    ///
    /// No-op if `id` is already active. If no graph is registered for `id`
    /// the pointer becomes unset.
    pub async fn set_active(&self, id: &SessionId) {
        let mut state = self.state.write().await;
        Self::activate(&mut state, id);
    }

    fn activate(state: &mut RegistryState, id: &SessionId) {
        if state.active.as_ref() == Some(id) {
            return;
        }
        if state.graphs.contains_key(id) {
            tracing::info!(session_id = %id, "session activated");
            state.active = Some(id.clone());
        } else {
            tracing::info!(session_id = %id, "unknown session, active session cleared");
            state.active = None;
        }
    }

    /// Remove and close the graph of `id`, clearing the active pointer if it
    /// pointed there. Returns whether a graph was registered.
    pub async fn release(&self, id: &SessionId) -> bool {
        let mut state = self.state.write().await;
        Self::remove(&mut state, id)
    }

    fn remove(state: &mut RegistryState, id: &SessionId) -> bool {
        let Some(graph) = state.graphs.remove(id) else {
            return false;
        };
        if state.active.as_ref() == Some(id) {
            state.active = None;
        }
        graph.close();
        tracing::info!(session_id = %id, "session released");
        true
    }

    /// Release whichever session is active. Returns its id.
    pub async fn release_active_session(&self) -> Option<SessionId> {
        let mut state = self.state.write().await;
        let id = state.active.clone()?;
        Self::remove(&mut state, &id);
        Some(id)
    }

    /// Whether `id` is the active session.
    pub async fn is_active(&self, id: &SessionId) -> bool {
        self.state.read().await.active.as_ref() == Some(id)
    }

    /// Id of the active session.
    pub async fn active_session_id(&self) -> Option<SessionId> {
        self.state.read().await.active.clone()
    }

    /// Graph of the active session.
    pub async fn active_graph(&self) -> Option<Arc<SessionGraph>> {
        let state = self.state.read().await;
        let id = state.active.as_ref()?;
        state.graphs.get(id).cloned()
    }

    /// Graph registered for `id`.
    pub async fn graph(&self, id: &SessionId) -> Option<Arc<SessionGraph>> {
        self.state.read().await.graphs.get(id).cloned()
    }

    /// Registered ids (sorted) and the active id, read in one critical
    /// section.
    pub async fn snapshot(&self) -> (Vec<SessionId>, Option<SessionId>) {
        let state = self.state.read().await;
        let mut ids: Vec<SessionId> = state.graphs.keys().cloned().collect();
        ids.sort();
        (ids, state.active.clone())
    }

    /// Number of registered graphs.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.graphs.len()
    }

    /// Release every session.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        state.active = None;
        for (id, graph) in state.graphs.drain() {
            graph.close();
            tracing::info!(session_id = %id, "session released");
        }
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
