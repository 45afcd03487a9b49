use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("payload is not valid json: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("payload has no id")]
    MissingId,
    #[error("payload id is not a non-negative integer")]
    InvalidId,
}
