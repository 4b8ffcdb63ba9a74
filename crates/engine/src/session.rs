use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::domain::{SessionId, WidgetValue};

use crate::error::EngineError;

/// Widget values, layout state, and memoized entries for one (session, path).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    values: BTreeMap<String, WidgetValue>,
    cache: BTreeMap<String, Value>,
}

impl PageState {
    pub fn cache_key(key: &str) -> String {
        format!("cache_{key}")
    }

    pub fn get(&self, widget_id: &str) -> Option<&WidgetValue> {
        self.values.get(widget_id)
    }

    /// Returns the stored value or `default`. The default is never written
    /// back: only explicit updates end up in the state.
    pub fn read_or(&self, widget_id: &str, default: WidgetValue) -> WidgetValue {
        self.values.get(widget_id).cloned().unwrap_or(default)
    }

    pub fn write(&mut self, widget_id: impl Into<String>, value: WidgetValue) {
        self.values.insert(widget_id.into(), value);
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.values.contains_key(widget_id)
    }

    pub fn cached(&self, key: &str) -> Option<&Value> {
        self.cache.get(&Self::cache_key(key))
    }

    /// Runs `producer` only the first time `key` is seen for this page; later
    /// calls get the stored value back.
    pub fn memoize<T, F>(&mut self, key: &str, producer: F) -> Result<T, EngineError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let cache_key = Self::cache_key(key);
        if let Some(stored) = self.cache.get(&cache_key) {
            return T::deserialize(stored).map_err(|source| EngineError::Cache {
                key: key.to_string(),
                source,
            });
        }

        let produced = producer();
        let stored = serde_json::to_value(&produced).map_err(|source| EngineError::Cache {
            key: key.to_string(),
            source,
        })?;
        self.cache.insert(cache_key, stored);
        Ok(produced)
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.cache.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pages: HashMap<String, PageState>,
}

impl Session {
    /// Page state is created lazily on first access.
    pub fn page(&mut self, path: &str) -> &mut PageState {
        self.pages.entry(path.to_string()).or_default()
    }

    pub fn existing_page(&self, path: &str) -> Option<&PageState> {
        self.pages.get(path)
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Structural map of sessions. Callers hold the engine's coarse lock while
/// touching it and lock individual sessions through their handles.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, SessionHandle>,
}

impl SessionStore {
    pub fn create(&mut self) -> SessionId {
        let id = SessionId::generate();
        self.sessions.insert(id, SessionHandle::default());
        id
    }

    pub fn remove(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn handle(&self, id: SessionId) -> Result<SessionHandle, EngineError> {
        self.sessions
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownSession(id))
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
