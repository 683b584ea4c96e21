//! Session identity.

use std::{fmt, sync::Arc};

use crate::SyncEngine;

/// Identifier of a logged-in account, unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A logged-in account and the engine syncing it.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    user_id: String,
    engine: Arc<dyn SyncEngine>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session.
    pub fn new(
        id: impl Into<SessionId>,
        user_id: impl Into<String>,
        engine: Arc<dyn SyncEngine>,
    ) -> Self {
        Self { id: id.into(), user_id: user_id.into(), engine }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Account user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Engine syncing this account.
    pub fn engine(&self) -> &Arc<dyn SyncEngine> {
        &self.engine
    }
}
