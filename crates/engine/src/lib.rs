//! Reactive execution core: per-session page state, one-shot actions, the
//! element-tree builder, and the per-connection message handler.

pub mod connections;
pub mod error;
pub mod handler;
pub mod pages;
pub mod pending;
pub mod session;
pub mod ui;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ConnectionId, SessionId, WidgetValue},
    protocol::PageTree,
};
use tracing::{debug, info};

pub use error::EngineError;
pub use handler::{ConnectionHandler, ConnectionState, MessageSink, Outcome};
pub use pages::{PageKind, PageRegistry};
pub use ui::Ui;

use connections::ConnectionRegistry;
use pending::{PendingActionSet, PendingActionTracker};
use session::{PageState, SessionStore};

#[derive(Debug, Default)]
struct Registry {
    sessions: SessionStore,
    connections: ConnectionRegistry,
    pending: PendingActionTracker,
}

/// Composition root shared by every connection.
///
/// The coarse lock only guards the structural maps. Renders lock the
/// session and the pending set of the connection they serve, so unrelated
/// sessions never wait on each other's page descriptions.
#[derive(Debug)]
pub struct Engine {
    pages: PageRegistry,
    inner: Mutex<Registry>,
    next_connection: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Engine {
    pub fn new(pages: PageRegistry) -> Self {
        Self {
            pages,
            inner: Mutex::new(Registry::default()),
            next_connection: AtomicU64::new(1),
        }
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    pub fn open_connection(&self) -> (ConnectionId, SessionId) {
        let connection = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed));
        let mut inner = lock(&self.inner);
        let session = inner.sessions.create();
        inner.connections.register(connection, session);
        inner.pending.install(connection);
        info!(connection = %connection, session_id = %session, "connection opened");
        (connection, session)
    }

    /// Idempotent. The session goes away with its last connection.
    pub fn close_connection(&self, connection: ConnectionId) {
        let mut inner = lock(&self.inner);
        inner.pending.remove(connection);
        let Some(entry) = inner.connections.unregister(connection) else {
            return;
        };
        if inner.connections.references(entry.session) == 0 {
            inner.sessions.remove(entry.session);
            debug!(session_id = %entry.session, "session removed");
        }
        info!(connection = %connection, session_id = %entry.session, "connection closed");
    }

    /// Returns the path the connection is bound to, which is `path` unless an
    /// earlier message already latched a different one.
    pub fn bind_path(&self, connection: ConnectionId, path: &str) -> Result<String, EngineError> {
        let mut inner = lock(&self.inner);
        let bound = inner.connections.bind(connection, path)?.to_string();
        if bound != path {
            debug!(connection = %connection, %bound, requested = path, "ignoring path change on bound connection");
        }
        Ok(bound)
    }

    pub fn bound_path(&self, connection: ConnectionId) -> Result<String, EngineError> {
        let inner = lock(&self.inner);
        inner
            .connections
            .get(connection)?
            .path
            .clone()
            .ok_or(EngineError::Unbound(connection))
    }

    pub fn session_of(&self, connection: ConnectionId) -> Result<SessionId, EngineError> {
        Ok(lock(&self.inner).connections.get(connection)?.session)
    }

    /// Runs `f` against the page state of `(session, path)` under the
    /// session's own lock.
    pub fn with_page<R>(
        &self,
        session: SessionId,
        path: &str,
        f: impl FnOnce(&mut PageState) -> R,
    ) -> Result<R, EngineError> {
        let handle = lock(&self.inner).sessions.handle(session)?;
        let mut session = lock(&handle);
        Ok(f(session.page(path)))
    }

    pub fn read_value(
        &self,
        session: SessionId,
        path: &str,
        widget_id: &str,
    ) -> Result<Option<WidgetValue>, EngineError> {
        self.with_page(session, path, |page| page.get(widget_id).cloned())
    }

    pub fn write_value(
        &self,
        session: SessionId,
        path: &str,
        widget_id: &str,
        value: WidgetValue,
    ) -> Result<(), EngineError> {
        self.with_page(session, path, |page| page.write(widget_id, value))
    }

    pub fn memoize<T, F>(
        &self,
        session: SessionId,
        path: &str,
        key: &str,
        producer: F,
    ) -> Result<T, EngineError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.with_page(session, path, |page| page.memoize(key, producer))?
    }

    pub fn mark_pending(&self, connection: ConnectionId, widget_id: &str) -> Result<(), EngineError> {
        let handle = lock(&self.inner).pending.handle(connection)?;
        lock(&handle).mark(widget_id);
        Ok(())
    }

    pub fn consume_pending(
        &self,
        connection: ConnectionId,
        widget_id: &str,
    ) -> Result<bool, EngineError> {
        let handle = lock(&self.inner).pending.handle(connection)?;
        let fired = lock(&handle).test_and_clear(widget_id);
        Ok(fired)
    }

    /// Rebuilds the page the connection is bound to. Build failures come
    /// back as an error tree, never as `Err`.
    pub fn render(&self, connection: ConnectionId) -> Result<PageTree, EngineError> {
        let (session, pending, path) = {
            let inner = lock(&self.inner);
            let entry = inner.connections.get(connection)?;
            let path = entry.path.clone().ok_or(EngineError::Unbound(connection))?;
            (
                inner.sessions.handle(entry.session)?,
                inner.pending.handle(connection)?,
                path,
            )
        };
        let page = self
            .pages
            .get(&path)
            .ok_or_else(|| EngineError::PageNotFound(path.clone()))?;

        let mut session = lock(&session);
        let mut pending = lock(&pending);
        debug!(connection = %connection, %path, "rendering page");
        Ok(ui::render_page(
            &page.describe,
            session.page(&path),
            &mut pending,
        ))
    }

    /// First paint for a plain GET: fresh state, nothing pending, nothing kept.
    pub fn render_initial(&self, path: &str) -> Option<(PageKind, PageTree)> {
        let page = self.pages.get(path)?;
        let mut state = PageState::default();
        let mut pending = PendingActionSet::default();
        let tree = ui::render_page(&page.describe, &mut state, &mut pending);
        Some((page.kind, tree))
    }

    pub fn session_count(&self) -> usize {
        lock(&self.inner).sessions.len()
    }

    pub fn connection_count(&self) -> usize {
        lock(&self.inner).connections.len()
    }

    pub fn pending_set_count(&self) -> usize {
        lock(&self.inner).pending.len()
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
