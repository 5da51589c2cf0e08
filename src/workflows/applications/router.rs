use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use super::directory::{IdentityDirectory, PostingDirectory};
use super::domain::{ApplicationId, ApplicationSubmission, PostingId, UserId, UserIdentity};
use super::repository::{ApplicationRepository, RepositoryError};
use super::review::ReviewListEntry;
use super::workflow::{ApplicationWorkflow, SubmissionError, WorkflowError};

/// Header carrying the acting user's id, set by the upstream auth proxy.
/// The identity collaborator resolves it to a full identity.
const ACTING_USER_HEADER: &str = "x-user-id";

/// Shared state for the application endpoints.
pub struct ApplicationRouterState<R, P, I> {
    pub workflow: Arc<ApplicationWorkflow<R, P>>,
    pub identities: Arc<I>,
}

impl<R, P, I> Clone for ApplicationRouterState<R, P, I> {
    fn clone(&self) -> Self {
        Self {
            workflow: Arc::clone(&self.workflow),
            identities: Arc::clone(&self.identities),
        }
    }
}

/// Router builder exposing HTTP endpoints for submission, status display,
/// status transitions, and the recruiter review listing.
pub fn application_router<R, P, I>(
    workflow: Arc<ApplicationWorkflow<R, P>>,
    identities: Arc<I>,
) -> Router
where
    R: ApplicationRepository + 'static,
    P: PostingDirectory + 'static,
    I: IdentityDirectory + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<R, P, I>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, P, I>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(transition_handler::<R, P, I>),
        )
        .route(
            "/api/v1/postings/:posting_id/applications",
            get(review_listing_handler::<R, P, I>),
        )
        .with_state(ApplicationRouterState {
            workflow,
            identities,
        })
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) new_status: String,
}

pub(crate) async fn submit_handler<R, P, I>(
    State(state): State<ApplicationRouterState<R, P, I>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PostingDirectory + 'static,
    I: IdentityDirectory + 'static,
{
    match state.workflow.submit(submission) {
        Ok(record) => {
            (StatusCode::CREATED, axum::Json(record.status_view())).into_response()
        }
        Err(SubmissionError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "application already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(SubmissionError::Repository(err)) => backend_failure(err.to_string()),
        Err(validation) => {
            let payload = json!({ "error": validation.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, P, I>(
    State(state): State<ApplicationRouterState<R, P, I>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PostingDirectory + 'static,
    I: IdentityDirectory + 'static,
{
    let id = ApplicationId(application_id);
    match state.workflow.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

pub(crate) async fn transition_handler<R, P, I>(
    State(state): State<ApplicationRouterState<R, P, I>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PostingDirectory + 'static,
    I: IdentityDirectory + 'static,
{
    let actor = match acting_identity(&headers, state.identities.as_ref()) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let id = ApplicationId(application_id);
    match state.workflow.set_status(&id, &request.new_status, &actor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

pub(crate) async fn review_listing_handler<R, P, I>(
    State(state): State<ApplicationRouterState<R, P, I>>,
    Path(posting_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PostingDirectory + 'static,
    I: IdentityDirectory + 'static,
{
    let actor = match acting_identity(&headers, state.identities.as_ref()) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let posting = PostingId(posting_id);
    match state.workflow.review_queue(&posting, &actor) {
        Ok(records) => {
            let entries: Vec<ReviewListEntry> =
                records.iter().map(ReviewListEntry::from_record).collect();
            (StatusCode::OK, axum::Json(entries)).into_response()
        }
        Err(err) => workflow_error_response(err),
    }
}

/// Resolve the acting user from the auth header through the identity
/// collaborator. Requests without a resolvable identity never reach the
/// workflow.
fn acting_identity<I>(headers: &HeaderMap, identities: &I) -> Result<UserIdentity, Response>
where
    I: IdentityDirectory,
{
    let raw = headers
        .get(ACTING_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let Some(raw) = raw else {
        let payload = json!({ "error": "missing acting user header" });
        return Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response());
    };

    identities.resolve(&UserId(raw.to_string())).ok_or_else(|| {
        let payload = json!({ "error": "unknown acting user" });
        (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
    })
}

fn workflow_error_response(err: WorkflowError) -> Response {
    let status = match &err {
        WorkflowError::ApplicationNotFound => StatusCode::NOT_FOUND,
        WorkflowError::Unauthorized => StatusCode::FORBIDDEN,
        WorkflowError::InvalidStatusValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::TransitionNotAllowed { .. } => StatusCode::CONFLICT,
        WorkflowError::Repository(err) => return backend_failure(err.to_string()),
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn backend_failure(detail: String) -> Response {
    let payload = json!({ "error": detail, "retryable": true });
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
}
