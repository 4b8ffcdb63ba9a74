use std::collections::HashMap;

use shared::domain::{ConnectionId, SessionId};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub session: SessionId,
    pub path: Option<String>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn register(&mut self, connection: ConnectionId, session: SessionId) {
        self.entries.insert(
            connection,
            ConnectionEntry {
                session,
                path: None,
            },
        );
    }

    pub fn unregister(&mut self, connection: ConnectionId) -> Option<ConnectionEntry> {
        self.entries.remove(&connection)
    }

    pub fn get(&self, connection: ConnectionId) -> Result<&ConnectionEntry, EngineError> {
        self.entries
            .get(&connection)
            .ok_or(EngineError::UnknownConnection(connection))
    }

    /// Latches the first announced path; later calls return the latched one.
    pub fn bind(&mut self, connection: ConnectionId, path: &str) -> Result<&str, EngineError> {
        let entry = self
            .entries
            .get_mut(&connection)
            .ok_or(EngineError::UnknownConnection(connection))?;
        Ok(entry.path.get_or_insert_with(|| path.to_string()).as_str())
    }

    pub fn references(&self, session: SessionId) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.session == session)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
