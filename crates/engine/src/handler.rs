use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{ConnectionId, SessionId},
    protocol::{ClientMessage, ServerMessage},
};
use tracing::{debug, warn};

use crate::{Engine, EngineError};

/// Outbound half of a live transport.
#[async_trait]
pub trait MessageSink: Send {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Opened,
    Bound(String),
    Closed,
}

/// What became of one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    Dropped,
    NoPage,
    Closed,
}

/// Drives one connection. Messages must be fed in arrival order; each one
/// is applied, rendered and sent before the next is looked at.
pub struct ConnectionHandler<S> {
    engine: Arc<Engine>,
    sink: S,
    connection: ConnectionId,
    session: SessionId,
    state: ConnectionState,
}

impl<S: MessageSink> ConnectionHandler<S> {
    pub fn open(engine: Arc<Engine>, sink: S) -> Self {
        let (connection, session) = engine.open_connection();
        Self {
            engine,
            sink,
            connection,
            session,
            state: ConnectionState::Opened,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub async fn handle_text(&mut self, text: &str) -> Outcome {
        if self.state == ConnectionState::Closed {
            return Outcome::Closed;
        }

        let message = match ClientMessage::parse(text) {
            Ok(message) => message,
            Err(err) => {
                warn!(connection = %self.connection, error = %err, "dropping malformed message");
                return Outcome::Dropped;
            }
        };
        debug!(connection = %self.connection, kind = message.kind(), path = message.path(), "message received");

        match self.apply(message) {
            Ok(true) => {}
            Ok(false) => return Outcome::NoPage,
            Err(err) => {
                warn!(connection = %self.connection, error = %err, "could not apply message");
                return Outcome::Dropped;
            }
        }

        let tree = match self.engine.render(self.connection) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(connection = %self.connection, error = %err, "render skipped");
                return Outcome::Dropped;
            }
        };

        let text = match ServerMessage::from(tree).encode() {
            Ok(text) => text,
            Err(err) => {
                warn!(connection = %self.connection, error = %err, "could not encode render frame");
                return Outcome::Dropped;
            }
        };
        if let Err(err) = self.sink.send_text(text).await {
            debug!(connection = %self.connection, error = %err, "transport gone; render not delivered");
        }
        Outcome::Rendered
    }

    /// Binds the path and applies the mutation. `false` when the bound path
    /// has no page behind it.
    fn apply(&mut self, message: ClientMessage) -> Result<bool, EngineError> {
        let path = self.engine.bind_path(self.connection, message.path())?;
        self.state = ConnectionState::Bound(path.clone());

        if !self.engine.pages().contains(&path) {
            warn!(connection = %self.connection, %path, "no page registered; not replying");
            return Ok(false);
        }

        match message {
            ClientMessage::ClientReady { .. } | ClientMessage::Navigate { .. } => {}
            ClientMessage::Update {
                widget_id, value, ..
            } => {
                self.engine
                    .write_value(self.session, &path, &widget_id, value)?;
            }
            ClientMessage::ButtonPress { widget_id, .. } => {
                self.engine.mark_pending(self.connection, &widget_id)?;
            }
        }
        Ok(true)
    }

    pub fn close(&mut self) {
        if self.state != ConnectionState::Closed {
            self.engine.close_connection(self.connection);
            self.state = ConnectionState::Closed;
        }
    }
}

impl<S> Drop for ConnectionHandler<S> {
    fn drop(&mut self) {
        if self.state != ConnectionState::Closed {
            self.engine.close_connection(self.connection);
        }
    }
}

#[cfg(test)]
#[path = "tests/handler_tests.rs"]
mod tests;
