//! Reference model of the session registry.

use std::collections::BTreeSet;

use super::{ModelSessionId, RegistryOperation};

/// Set of sessions plus an active pointer, with the registry's rules and
/// nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    sessions: BTreeSet<ModelSessionId>,
    active: Option<ModelSessionId>,
}

impl ModelRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: RegistryOperation) {
        match op {
            RegistryOperation::Create(id) => {
                self.sessions.insert(id);
                self.active = Some(id);
            },
            RegistryOperation::SetActive(id) => {
                self.active = self.sessions.contains(&id).then_some(id);
            },
            RegistryOperation::Release(id) => self.release(id),
            RegistryOperation::ReleaseActive => {
                if let Some(id) = self.active {
                    self.release(id);
                }
            },
        }
    }

    fn release(&mut self, id: ModelSessionId) {
        self.sessions.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    /// Registered sessions, ascending.
    pub fn sessions(&self) -> Vec<ModelSessionId> {
        self.sessions.iter().copied().collect()
    }

    /// Active session.
    pub fn active(&self) -> Option<ModelSessionId> {
        self.active
    }
}
