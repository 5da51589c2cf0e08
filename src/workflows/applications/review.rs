use serde::Serialize;

use super::domain::{ApplicantSnapshot, ApplicationId, UserId, UserIdentity};
use super::repository::ApplicationRecord;
use super::workflow::can_mutate_status;
use crate::storage::RetrievalHandle;

/// How much of a cover letter the review list shows before truncating.
pub const COVER_LETTER_PREVIEW_CHARS: usize = 200;

const ELLIPSIS: char = '…';

/// Display form of a cover letter. Letters at or under the preview length
/// render unmodified with no expand control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverLetterPreview {
    pub text: String,
    pub truncated: bool,
}

pub fn cover_letter_preview(cover_letter: &str) -> CoverLetterPreview {
    let mut chars = cover_letter.char_indices();
    match chars.nth(COVER_LETTER_PREVIEW_CHARS) {
        None => CoverLetterPreview {
            text: cover_letter.to_string(),
            truncated: false,
        },
        Some((cut, _)) => {
            let mut text = cover_letter[..cut].to_string();
            text.push(ELLIPSIS);
            CoverLetterPreview {
                text,
                truncated: true,
            }
        }
    }
}

/// One entry in the recruiter-facing review listing.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewListEntry {
    pub application_id: ApplicationId,
    pub applicant: ApplicantSnapshot,
    pub cover_letter: String,
    pub cover_letter_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<RetrievalHandle>,
    pub status: &'static str,
}

impl ReviewListEntry {
    pub fn from_record(record: &ApplicationRecord) -> Self {
        let preview = cover_letter_preview(&record.cover_letter);
        Self {
            application_id: record.id.clone(),
            applicant: record.applicant.clone(),
            cover_letter: preview.text,
            cover_letter_truncated: preview.truncated,
            resume_url: record.resume_url.clone(),
            status: record.status.label(),
        }
    }
}

/// Client-side display state for one row of the review panel. Expanding a
/// cover letter is a pure display-state flip over the already-loaded text;
/// no refetch happens.
#[derive(Debug, Clone)]
pub struct ReviewRow {
    record: ApplicationRecord,
    can_transition: bool,
    expanded: bool,
    transition_in_flight: bool,
}

impl ReviewRow {
    pub fn id(&self) -> &ApplicationId {
        &self.record.id
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    /// The cover letter text this row currently shows.
    pub fn visible_cover_letter(&self) -> CoverLetterPreview {
        if self.expanded {
            CoverLetterPreview {
                text: self.record.cover_letter.clone(),
                truncated: false,
            }
        } else {
            cover_letter_preview(&self.record.cover_letter)
        }
    }

    /// Whether an expand/collapse control is rendered at all.
    pub fn shows_expand_control(&self) -> bool {
        cover_letter_preview(&self.record.cover_letter).truncated || self.expanded
    }

    /// The status control is disabled for viewers who cannot mutate and
    /// while a transition request is in flight.
    pub fn status_control_enabled(&self) -> bool {
        self.can_transition && !self.transition_in_flight
    }
}

/// Review panel state for one posting's applications, as seen by one
/// viewer. Owns the in-flight guard that prevents overlapping transition
/// submissions from the same view.
#[derive(Debug, Clone, Default)]
pub struct ReviewPanel {
    rows: Vec<ReviewRow>,
}

impl ReviewPanel {
    pub fn from_records(
        records: Vec<ApplicationRecord>,
        viewer: &UserIdentity,
        posting_owner: &UserId,
    ) -> Self {
        let can_transition = can_mutate_status(viewer, posting_owner);
        let rows = records
            .into_iter()
            .map(|record| ReviewRow {
                record,
                can_transition,
                expanded: false,
                transition_in_flight: false,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    pub fn row(&self, id: &ApplicationId) -> Option<&ReviewRow> {
        self.rows.iter().find(|row| row.record.id == *id)
    }

    fn row_mut(&mut self, id: &ApplicationId) -> Option<&mut ReviewRow> {
        self.rows.iter_mut().find(|row| row.record.id == *id)
    }

    pub fn toggle_expand(&mut self, id: &ApplicationId) {
        if let Some(row) = self.row_mut(id) {
            row.expanded = !row.expanded;
        }
    }

    /// Mark a transition as in flight. Returns `false` when the control is
    /// disabled, in which case the caller must not dispatch a request.
    pub fn begin_transition(&mut self, id: &ApplicationId) -> bool {
        match self.row_mut(id) {
            Some(row) if row.status_control_enabled() => {
                row.transition_in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// Clear the in-flight guard, adopting the record the workflow
    /// returned when the request succeeded.
    pub fn complete_transition(&mut self, id: &ApplicationId, updated: Option<ApplicationRecord>) {
        if let Some(row) = self.row_mut(id) {
            row.transition_in_flight = false;
            if let Some(record) = updated {
                row.record = record;
            }
        }
    }
}
