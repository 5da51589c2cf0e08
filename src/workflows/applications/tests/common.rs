use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::storage::RetrievalHandle;
use crate::workflows::applications::directory::InMemoryDirectory;
use crate::workflows::applications::domain::{
    ApplicantSnapshot, ApplicationId, ApplicationStatus, ApplicationSubmission, PostingId, UserId,
    UserIdentity, UserRole,
};
use crate::workflows::applications::repository::{
    ApplicationRecord, ApplicationRepository, InMemoryApplicationStore, RepositoryError,
};
use crate::workflows::applications::router::application_router;
use crate::workflows::applications::workflow::ApplicationWorkflow;

pub(super) const POSTING: &str = "posting-77";
pub(super) const OWNER: &str = "recruiter-anna";
pub(super) const RIVAL: &str = "recruiter-bram";
pub(super) const SEEKER: &str = "seeker-cleo";

pub(super) fn recruiter(id: &str) -> UserIdentity {
    UserIdentity {
        id: UserId(id.to_string()),
        fullname: format!("Recruiter {id}"),
        email: format!("{id}@corp.example"),
        role: UserRole::Recruiter,
        phone_number: None,
    }
}

pub(super) fn job_seeker(id: &str) -> UserIdentity {
    UserIdentity {
        id: UserId(id.to_string()),
        fullname: format!("Seeker {id}"),
        email: format!("{id}@mail.example"),
        role: UserRole::JobSeeker,
        phone_number: Some("+31 6 1234 5678".to_string()),
    }
}

pub(super) fn applicant() -> ApplicantSnapshot {
    ApplicantSnapshot {
        fullname: "Cleo Janssen".to_string(),
        email: "cleo@mail.example".to_string(),
        phone_number: Some("+31 6 1234 5678".to_string()),
    }
}

/// A cover letter of exactly `chars` characters.
pub(super) fn cover_letter(chars: usize) -> String {
    "I would be a strong addition to the team because..."
        .chars()
        .cycle()
        .take(chars)
        .collect()
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        posting_id: PostingId(POSTING.to_string()),
        applicant: applicant(),
        cover_letter: cover_letter(120),
        resume_url: Some(RetrievalHandle::new(
            "https://files.example.com/documents/1700000000000-000001-resume.pdf",
        )),
    }
}

/// Directory with one owned posting, its recruiter, a rival recruiter, and
/// a job seeker.
pub(super) fn directory() -> Arc<InMemoryDirectory> {
    let directory = InMemoryDirectory::default();
    directory.register_identity(recruiter(OWNER));
    directory.register_identity(recruiter(RIVAL));
    directory.register_identity(job_seeker(SEEKER));
    directory.register_posting_owner(PostingId(POSTING.to_string()), UserId(OWNER.to_string()));
    Arc::new(directory)
}

pub(super) fn build_workflow() -> (
    Arc<ApplicationWorkflow<InMemoryApplicationStore, InMemoryDirectory>>,
    Arc<InMemoryApplicationStore>,
    Arc<InMemoryDirectory>,
) {
    let repository = Arc::new(InMemoryApplicationStore::default());
    let directory = directory();
    let workflow = Arc::new(ApplicationWorkflow::new(
        repository.clone(),
        directory.clone(),
    ));
    (workflow, repository, directory)
}

pub(super) fn application_router_with_workflow() -> (
    Router,
    Arc<ApplicationWorkflow<InMemoryApplicationStore, InMemoryDirectory>>,
    Arc<InMemoryApplicationStore>,
) {
    let (workflow, repository, directory) = build_workflow();
    let router = application_router(workflow.clone(), directory);
    (router, workflow, repository)
}

/// Repository double whose every operation reports an outage.
pub(super) struct UnavailableStore;

impl ApplicationRepository for UnavailableStore {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    fn set_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    fn for_posting(
        &self,
        _posting: &PostingId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
