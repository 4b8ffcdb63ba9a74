use shared::domain::{ConnectionId, SessionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),
    #[error("connection {0} has not announced a path yet")]
    Unbound(ConnectionId),
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
    #[error("no page registered for '{0}'")]
    PageNotFound(String),
    #[error("a tab group needs at least one label")]
    EmptyTabs,
    #[error("cached value '{key}' could not be converted: {source}")]
    Cache {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
