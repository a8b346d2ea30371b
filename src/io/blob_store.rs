use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use crate::error::AlignmentError;

/// Keyed byte storage holding the recordings to align.
pub trait BlobStore: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, AlignmentError>;

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), AlignmentError>;
}

/// Blobs stored as files under a root directory; keys are relative paths.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AlignmentError> {
        let rel = Path::new(key);
        let is_plain = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_plain {
            return Err(AlignmentError::invalid_input(format!(
                "blob key must be a relative path inside the store: {key:?}"
            )));
        }
        Ok(self.root.join(rel))
    }
}

fn map_io(key: &str, context: &'static str, err: std::io::Error) -> AlignmentError {
    match err.kind() {
        std::io::ErrorKind::NotFound => AlignmentError::NotFound {
            key: key.to_string(),
        },
        std::io::ErrorKind::PermissionDenied => AlignmentError::AccessDenied {
            key: key.to_string(),
        },
        _ => AlignmentError::io(context, err),
    }
}

impl BlobStore for FsBlobStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, AlignmentError> {
        let path = self.path_for(key)?;
        let bytes = std::fs::read(&path).map_err(|e| map_io(key, "read blob", e))?;
        tracing::debug!(key, bytes = bytes.len(), path = %path.display(), "fetched blob");
        Ok(bytes)
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), AlignmentError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| map_io(key, "create blob directory", e))?;
        }
        std::fs::write(&path, bytes).map_err(|e| map_io(key, "write blob", e))?;
        tracing::debug!(key, bytes = bytes.len(), path = %path.display(), "stored blob");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.blobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into(), bytes);
        self
    }
}

impl BlobStore for MemoryBlobStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, AlignmentError> {
        self.blobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| AlignmentError::NotFound {
                key: key.to_string(),
            })
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), AlignmentError> {
        self.blobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
