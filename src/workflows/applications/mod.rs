//! Application intake and recruiter review: the submission pipeline, the
//! status transition workflow, and the review-panel composition.

pub mod directory;
pub mod domain;
pub mod repository;
pub mod review;
pub mod router;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use directory::{IdentityDirectory, InMemoryDirectory, PostingDirectory};
pub use domain::{
    ApplicantSnapshot, ApplicationId, ApplicationStatus, ApplicationSubmission, PostingId, UserId,
    UserIdentity, UserRole, COVER_LETTER_MAX_CHARS, COVER_LETTER_MIN_CHARS,
};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, InMemoryApplicationStore,
    RepositoryError,
};
pub use review::{
    cover_letter_preview, CoverLetterPreview, ReviewListEntry, ReviewPanel, ReviewRow,
    COVER_LETTER_PREVIEW_CHARS,
};
pub use router::application_router;
pub use workflow::{
    can_mutate_status, ApplicationWorkflow, SubmissionError, WorkflowError,
};
