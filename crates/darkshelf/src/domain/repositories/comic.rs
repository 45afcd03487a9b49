use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComicRepositoryError {
    #[error("error request comic: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("other error: {0}")]
    Other(String),
}

/// A response whose body has been read to the end
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

#[async_trait]
pub trait ComicRepository: Send + Sync {
    /// Comic detail document from one of the mirrors
    async fn fetch_detail(&self, id: u64) -> Result<RawResponse, ComicRepositoryError>;
    /// Info page of the same comic, only its size is looked at
    async fn fetch_verification(&self, id: u64) -> Result<RawResponse, ComicRepositoryError>;
}
