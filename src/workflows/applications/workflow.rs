use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::directory::PostingDirectory;
use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, PostingId, UserId, UserIdentity,
    UserRole, COVER_LETTER_MAX_CHARS, COVER_LETTER_MIN_CHARS,
};
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};

/// Service facade over the record store and the posting-ownership
/// collaborator: submission intake plus the status transition workflow.
pub struct ApplicationWorkflow<R, P> {
    repository: Arc<R>,
    postings: Arc<P>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// The one place the authorization rule lives: only the recruiter owning
/// the posting may mutate status. Both the API boundary and any UI
/// enable/disable logic call this.
pub fn can_mutate_status(actor: &UserIdentity, posting_owner: &UserId) -> bool {
    actor.role == UserRole::Recruiter && actor.id == *posting_owner
}

/// Single decision point for transition legality. Every target is
/// currently reachable from every state, so recruiters may revisit a
/// closed decision; a stricter policy swaps in here without touching
/// callers.
const fn transition_allowed(_from: ApplicationStatus, _to: ApplicationStatus) -> bool {
    true
}

impl<R, P> ApplicationWorkflow<R, P>
where
    R: ApplicationRepository + 'static,
    P: PostingDirectory + 'static,
{
    pub fn new(repository: Arc<R>, postings: Arc<P>) -> Self {
        Self {
            repository,
            postings,
        }
    }

    /// Validate and persist a new submission. The record starts `pending`
    /// and carries an immutable cover letter and resume handle.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, SubmissionError> {
        let length = submission.cover_letter.chars().count();
        if length < COVER_LETTER_MIN_CHARS {
            return Err(SubmissionError::CoverLetterTooShort {
                length,
                minimum: COVER_LETTER_MIN_CHARS,
            });
        }
        if length > COVER_LETTER_MAX_CHARS {
            return Err(SubmissionError::CoverLetterTooLong {
                length,
                maximum: COVER_LETTER_MAX_CHARS,
            });
        }
        if submission.resume_url.is_none() {
            return Err(SubmissionError::MissingResume);
        }

        let record = ApplicationRecord {
            id: next_application_id(),
            posting_id: submission.posting_id,
            applicant: submission.applicant,
            cover_letter: submission.cover_letter,
            resume_url: submission.resume_url,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(application_id = %stored.id.0, posting_id = %stored.posting_id.0, "application submitted");
        Ok(stored)
    }

    /// Move an application to the requested status on behalf of `actor`.
    ///
    /// The raw label is parsed here so callers get `InvalidStatusValue`
    /// for anything outside the enumerated set. Re-issuing the current
    /// status is a no-op success; nothing is mutated on any failure path.
    pub fn set_status(
        &self,
        id: &ApplicationId,
        requested: &str,
        actor: &UserIdentity,
    ) -> Result<ApplicationRecord, WorkflowError> {
        let target = ApplicationStatus::parse(requested).ok_or_else(|| {
            WorkflowError::InvalidStatusValue {
                value: requested.to_string(),
            }
        })?;

        let record = self
            .repository
            .fetch(id)?
            .ok_or(WorkflowError::ApplicationNotFound)?;

        // A posting without a resolvable owner cannot authorize anyone.
        let owner = self
            .postings
            .owner_of(&record.posting_id)
            .ok_or(WorkflowError::Unauthorized)?;
        if !can_mutate_status(actor, &owner) {
            return Err(WorkflowError::Unauthorized);
        }

        if !transition_allowed(record.status, target) {
            return Err(WorkflowError::TransitionNotAllowed {
                from: record.status,
                to: target,
            });
        }

        if record.status == target {
            return Ok(record);
        }

        let updated = self.repository.set_status(id, target)?;
        info!(
            application_id = %updated.id.0,
            from = record.status.label(),
            to = target.label(),
            "application status changed"
        );
        Ok(updated)
    }

    /// Fetch a single record for status display.
    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, WorkflowError> {
        self.repository
            .fetch(id)?
            .ok_or(WorkflowError::ApplicationNotFound)
    }

    /// All records for a posting, gated by the same ownership rule as
    /// status mutation: the review queue is a recruiter-only surface.
    pub fn review_queue(
        &self,
        posting: &PostingId,
        actor: &UserIdentity,
    ) -> Result<Vec<ApplicationRecord>, WorkflowError> {
        let owner = self
            .postings
            .owner_of(posting)
            .ok_or(WorkflowError::Unauthorized)?;
        if !can_mutate_status(actor, &owner) {
            return Err(WorkflowError::Unauthorized);
        }
        Ok(self.repository.for_posting(posting)?)
    }
}

/// Why a submission was refused at intake.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("cover letter has {length} characters, minimum is {minimum}")]
    CoverLetterTooShort { length: usize, minimum: usize },
    #[error("cover letter has {length} characters, maximum is {maximum}")]
    CoverLetterTooLong { length: usize, maximum: usize },
    #[error("a resume upload is required before submitting")]
    MissingResume,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Why a status transition was refused.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("application not found")]
    ApplicationNotFound,
    #[error("acting user may not change this application's status")]
    Unauthorized,
    #[error("'{value}' is not a valid application status")]
    InvalidStatusValue { value: String },
    #[error("status may not move from {} to {}", from.label(), to.label())]
    TransitionNotAllowed {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for WorkflowError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => WorkflowError::ApplicationNotFound,
            other => WorkflowError::Repository(other),
        }
    }
}
