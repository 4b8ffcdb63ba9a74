use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("failed to encode server message: {0}")]
    Encode(serde_json::Error),
}
