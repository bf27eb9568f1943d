use std::path::{Path, PathBuf};

use crate::{error::StoreError, spotify::Credentials};

/// On-disk home of the reusable login blob.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        async_fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    pub async fn load(&self) -> Result<Credentials, StoreError> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    pub async fn persist(&self, credentials: &Credentials) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(credentials).map_err(|e| StoreError::Encode {
            path: self.path.clone(),
            source: e,
        })?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| self.io_error(e))
    }

    /// Deletes the blob. Returns `false` when there was nothing to delete.
    pub async fn clear(&self) -> Result<bool, StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
