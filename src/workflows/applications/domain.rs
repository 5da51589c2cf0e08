use serde::{Deserialize, Serialize};

use crate::storage::RetrievalHandle;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Opaque foreign key to a job posting; posting CRUD lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingId(pub String);

/// Identifier for a user owned by the external identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Roles this subsystem distinguishes. Only recruiters may mutate review
/// status; job seekers have read-only visibility of their own records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    JobSeeker,
    Recruiter,
}

/// Read-only identity supplied by the external auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub fullname: String,
    pub email: String,
    pub role: UserRole,
    pub phone_number: Option<String>,
}

/// Display snapshot of the applicant captured at submission time. Not
/// re-validated here; the identity store owns the canonical copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSnapshot {
    pub fullname: String,
    pub email: String,
    pub phone_number: Option<String>,
}

/// Review status of an application. Set to `Pending` at creation and
/// mutated only through the status workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Parse a wire label back into a status. Returns `None` for anything
    /// outside the enumerated set.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pending" => Some(ApplicationStatus::Pending),
            "reviewing" => Some(ApplicationStatus::Reviewing),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Inbound submission payload, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub posting_id: PostingId,
    pub applicant: ApplicantSnapshot,
    pub cover_letter: String,
    #[serde(default)]
    pub resume_url: Option<RetrievalHandle>,
}

/// Cover letter length bounds, counted in characters.
pub const COVER_LETTER_MIN_CHARS: usize = 50;
pub const COVER_LETTER_MAX_CHARS: usize = 2000;
