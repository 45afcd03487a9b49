use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use darkshelf_lib::models::CatalogEntry;

use crate::domain::repositories::snapshot::{SnapshotRepository, SnapshotRepositoryError};

/// Snapshot stored as a single json array on disk
#[derive(Clone)]
pub struct SnapshotRepositoryImpl {
    path: PathBuf,
}

impl SnapshotRepositoryImpl {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: PathBuf::new().join(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut path: OsString = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }
}

#[async_trait]
impl SnapshotRepository for SnapshotRepositoryImpl {
    async fn save(&self, entries: &[CatalogEntry]) -> Result<(), SnapshotRepositoryError> {
        let data = serde_json::to_vec(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // readers either see the previous snapshot or the new one, never a partial file
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &data).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            if let Err(e) = tokio::fs::remove_file(&temp_path).await {
                warn!("failed to remove {}: {e}", temp_path.display());
            }
            return Err(e.into());
        }

        debug!(
            "wrote {} entries ({} bytes) to {}",
            entries.len(),
            data.len(),
            self.path.display()
        );

        Ok(())
    }

    async fn load(&self) -> Result<Vec<CatalogEntry>, SnapshotRepositoryError> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }
}
