use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex},
};

use shared::domain::ConnectionId;

use crate::error::EngineError;

/// One-shot actions fired since the last render of a connection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingActionSet {
    fired: BTreeSet<String>,
}

impl PendingActionSet {
    pub fn mark(&mut self, widget_id: impl Into<String>) {
        self.fired.insert(widget_id.into());
    }

    /// Reports whether the action fired and clears it in the same step, so a
    /// press is observed at most once.
    pub fn test_and_clear(&mut self, widget_id: &str) -> bool {
        self.fired.remove(widget_id)
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.fired.contains(widget_id)
    }

    /// Drops everything nobody consumed during a render pass.
    pub fn sweep(&mut self) -> Vec<String> {
        std::mem::take(&mut self.fired).into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

pub type PendingHandle = Arc<Mutex<PendingActionSet>>;

#[derive(Debug, Default)]
pub struct PendingActionTracker {
    sets: HashMap<ConnectionId, PendingHandle>,
}

impl PendingActionTracker {
    pub fn install(&mut self, connection: ConnectionId) {
        self.sets.entry(connection).or_default();
    }

    pub fn remove(&mut self, connection: ConnectionId) -> bool {
        self.sets.remove(&connection).is_some()
    }

    pub fn handle(&self, connection: ConnectionId) -> Result<PendingHandle, EngineError> {
        self.sets
            .get(&connection)
            .cloned()
            .ok_or(EngineError::UnknownConnection(connection))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
