use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantSnapshot, ApplicationId, ApplicationStatus, PostingId};
use crate::storage::RetrievalHandle;

/// Durable entity representing one job seeker's submission to one posting.
///
/// Created exactly once, read many times, mutated only via status
/// transitions, never deleted. `resume_url`, once set, is never reassigned;
/// a new resume means a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub posting_id: PostingId,
    pub applicant: ApplicantSnapshot,
    pub cover_letter: String,
    pub resume_url: Option<RetrievalHandle>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            posting_id: self.posting_id.clone(),
            status: self.status.label(),
            resume_url: self.resume_url.clone(),
            submitted_at: self.created_at,
        }
    }
}

/// Sanitized representation of an application's externally visible state.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub posting_id: PostingId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<RetrievalHandle>,
    pub submitted_at: DateTime<Utc>,
}

/// Storage abstraction so the workflow can be exercised in isolation.
/// Updates are restricted to the `status` field by contract; the workflow
/// enforces that, not the store.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn set_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn for_posting(&self, posting: &PostingId) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-guarded map store used for local deployments and tests. Each call
/// is a single atomic operation at the store, matching the contract the
/// workflow relies on.
#[derive(Default, Clone)]
pub struct InMemoryApplicationStore {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationStore {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("record store mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("record store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn set_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("record store mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    fn for_posting(&self, posting: &PostingId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("record store mutex poisoned");
        let mut records: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.posting_id == *posting)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(records)
    }
}
