use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::DomainError;
use crate::domain::ports::BlobStore;

/// Blobs as files under `root`, published below `public_url`.
pub struct FsBlobStore {
    root: PathBuf,
    public_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Keys are relative paths of plain segments.
    fn path_of(&self, key: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(DomainError::InvalidInput(format!("Invalid blob key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let path = self.path_of(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DomainError::Internal(e.to_string()))?;
        }
        fs::write(&path, bytes).map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(format!("{}/{}", self.public_url, key))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let path = self.path_of(key)?;
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Internal(e.to_string())),
        }
    }
}
