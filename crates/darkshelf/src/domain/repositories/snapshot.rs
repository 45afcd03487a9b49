use async_trait::async_trait;
use darkshelf_lib::models::CatalogEntry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotRepositoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Replaces the whole snapshot with `entries`
    async fn save(&self, entries: &[CatalogEntry]) -> Result<(), SnapshotRepositoryError>;
    /// Current snapshot, empty if none was written yet
    async fn load(&self) -> Result<Vec<CatalogEntry>, SnapshotRepositoryError>;
}
