use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::policy::{FileConstraintPolicy, FileDescriptor, PolicyViolation};
use super::store::{ContentKind, ObjectStore, RetrievalHandle, StorageError};

/// One file received from a client: declared metadata plus the full payload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Validate-then-persist stage for uploads.
///
/// The gate is configured per use case (resume vs. logo) but the algorithm
/// is identical: evaluate the constraint policy against everything
/// received, and only on acceptance derive a key and write the single file
/// through the durable store. Nothing is written on a rejected call.
pub struct UploadGate<S> {
    policy: FileConstraintPolicy,
    kind: ContentKind,
    store: Arc<S>,
}

static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl<S> UploadGate<S>
where
    S: ObjectStore,
{
    pub fn new(policy: FileConstraintPolicy, kind: ContentKind, store: Arc<S>) -> Self {
        Self {
            policy,
            kind,
            store,
        }
    }

    /// Gate for applicant resumes (PDF documents).
    pub fn resume(store: Arc<S>) -> Self {
        Self::new(FileConstraintPolicy::resume(), ContentKind::Document, store)
    }

    /// Gate for company logos (raster images).
    pub fn logo(store: Arc<S>) -> Self {
        Self::new(FileConstraintPolicy::logo(), ContentKind::Image, store)
    }

    pub fn policy(&self) -> &FileConstraintPolicy {
        &self.policy
    }

    /// Accept everything that arrived under the file field, enforce the
    /// policy, and persist the single accepted file.
    pub fn receive(&self, files: Vec<UploadedFile>) -> Result<RetrievalHandle, UploadError> {
        let descriptors: Vec<FileDescriptor> = files
            .iter()
            .map(|file| FileDescriptor {
                media_type: file.media_type.clone(),
                size_bytes: file.bytes.len() as u64,
            })
            .collect();
        self.policy.accepts(&descriptors)?;

        let Some(file) = files.into_iter().next() else {
            return Err(PolicyViolation::MissingFile.into());
        };

        let sequence = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let key = object_key(&file.original_name, Utc::now(), sequence);

        self.store
            .put(&file.bytes, self.kind, &key)
            .map_err(|err| {
                warn!(%key, error = %err, "object store rejected upload");
                UploadError::from(err)
            })
    }
}

/// Derive a storage key that is unique per upload even when two clients
/// submit the same file name within the same millisecond: the process-wide
/// sequence disambiguates structurally, the timestamp keeps keys sortable.
pub fn object_key(original_name: &str, at: DateTime<Utc>, sequence: u64) -> String {
    format!(
        "{}-{sequence:06}-{}",
        at.timestamp_millis(),
        sanitize_file_name(original_name)
    )
}

fn sanitize_file_name(name: &str) -> String {
    // Strip any client-supplied path, keep a conservative character set.
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_ascii_lowercase();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(['-', '.']);
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Failure modes of the gate: a violated constraint (client-correctable) or
/// an unreachable backend (retryable).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    pub const fn is_retryable(&self) -> bool {
        matches!(self, UploadError::Storage(_))
    }
}
