use crate::db::{
    errors::{DbError, Result},
    models::file_storage::{FileStorageRequest, FileStorageResponse},
};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Trait for document content storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store file content under the requested key
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse>;

    /// Retrieve file content using storage key
    async fn retrieve(&self, storage_key: &str) -> Result<Vec<u8>>;

    /// Delete file content using storage key. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> Result<()>;
}

/// Local filesystem storage backend - keys are paths relative to `base_path`
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Keys must stay inside the storage root
    fn resolve(&self, storage_key: &str) -> Result<PathBuf> {
        let relative = Path::new(storage_key);
        let contained = !storage_key.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(DbError::Other(anyhow::anyhow!("Invalid storage key: {storage_key:?}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse> {
        let full_path = self.resolve(&request.storage_key)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // create_new: never overwrite content that belongs to another document
        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&full_path).await?;
        file.write_all(&request.content).await?;
        file.sync_all().await?;

        tracing::debug!(storage_key = %request.storage_key, size = request.content.len(), "Stored content");

        Ok(FileStorageResponse {
            storage_key: request.storage_key,
            size_bytes: request.content.len() as u64,
        })
    }

    async fn retrieve(&self, storage_key: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(storage_key)?;
        // a missing file surfaces as DbError::NotFound through From<io::Error>
        Ok(fs::read(&full_path).await?)
    }

    async fn delete(&self, storage_key: &str) -> Result<()> {
        let full_path = self.resolve(storage_key)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create the storage backend from configuration
pub async fn create_file_storage(config: &crate::config::StorageConfig) -> Result<Arc<dyn FileStorage>> {
    tracing::info!("Creating local file storage backend (path: {:?})", config.path);
    if let Err(e) = fs::create_dir_all(&config.path).await {
        return Err(DbError::Other(anyhow::anyhow!(
            "Failed to create local storage directory {:?}: {}",
            config.path,
            e
        )));
    }
    Ok(Arc::new(LocalFileStorage::new(config.path.clone())))
}
