use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resource classification applied to stored objects so retrieval tooling
/// serves them with the right content handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Document,
    Image,
}

impl ContentKind {
    pub const fn segment(self) -> &'static str {
        match self {
            ContentKind::Document => "documents",
            ContentKind::Image => "images",
        }
    }
}

/// Stable, publicly fetchable reference to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalHandle {
    pub url: String,
}

impl RetrievalHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// The durable store itself is unreachable or failed mid-operation.
/// Transient and safe to retry, unlike policy violations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Durable object storage capability. Core logic depends on this contract
/// only; a local filesystem, an in-memory map, or a remote blob service are
/// interchangeable behind it.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        bytes: &[u8],
        kind: ContentKind,
        key: &str,
    ) -> Result<RetrievalHandle, StorageError>;
}

/// Filesystem-backed store. Objects land under
/// `<root>/<documents|images>/<key>` and handles are built from the
/// configured public base URL.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStore {
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        let mut public_base_url = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }
        Self {
            root,
            public_base_url,
        }
    }
}

impl ObjectStore for LocalDiskStore {
    fn put(
        &self,
        bytes: &[u8],
        kind: ContentKind,
        key: &str,
    ) -> Result<RetrievalHandle, StorageError> {
        let dir = self.root.join(kind.segment());
        fs::create_dir_all(&dir).map_err(|err| StorageError::Unavailable(err.to_string()))?;

        // Stage then rename so an interrupted write never leaves a
        // half-visible object under the final key.
        let staged = dir.join(format!("{key}.part"));
        let target = dir.join(key);
        fs::write(&staged, bytes).map_err(|err| StorageError::Unavailable(err.to_string()))?;
        fs::rename(&staged, &target).map_err(|err| {
            let _ = fs::remove_file(&staged);
            StorageError::Unavailable(err.to_string())
        })?;

        Ok(RetrievalHandle::new(format!(
            "{}/{}/{key}",
            self.public_base_url,
            kind.segment()
        )))
    }
}
