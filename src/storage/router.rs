use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::json;

use super::gate::{UploadError, UploadGate, UploadedFile};
use super::store::ObjectStore;

/// Transport ceiling for multipart bodies. Deliberately above every policy
/// limit so the gate, not the framework, names the violated constraint.
const MAX_UPLOAD_HTTP_BYTES: usize = 16 * 1024 * 1024;

/// The multipart field uploads must arrive under.
const FILE_FIELD: &str = "file";

/// The per-use-case gates the upload endpoints dispatch to.
pub struct UploadGates<S> {
    pub resume: Arc<UploadGate<S>>,
    pub logo: Arc<UploadGate<S>>,
}

impl<S> Clone for UploadGates<S> {
    fn clone(&self) -> Self {
        Self {
            resume: Arc::clone(&self.resume),
            logo: Arc::clone(&self.logo),
        }
    }
}

impl<S> UploadGates<S>
where
    S: ObjectStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resume: Arc::new(UploadGate::resume(Arc::clone(&store))),
            logo: Arc::new(UploadGate::logo(store)),
        }
    }
}

/// Router builder exposing the upload endpoints.
pub fn upload_router<S>(gates: UploadGates<S>) -> Router
where
    S: ObjectStore + 'static,
{
    Router::new()
        .route("/api/v1/uploads/resume", post(resume_upload_handler::<S>))
        .route("/api/v1/uploads/logo", post(logo_upload_handler::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_HTTP_BYTES))
        .with_state(gates)
}

pub(crate) async fn resume_upload_handler<S>(
    State(gates): State<UploadGates<S>>,
    multipart: Multipart,
) -> Response
where
    S: ObjectStore + 'static,
{
    upload_response(collect_files(multipart).await, &gates.resume)
}

pub(crate) async fn logo_upload_handler<S>(
    State(gates): State<UploadGates<S>>,
    multipart: Multipart,
) -> Response
where
    S: ObjectStore + 'static,
{
    upload_response(collect_files(multipart).await, &gates.logo)
}

/// Drain the multipart stream, keeping every part submitted under the file
/// field. The gate decides whether that set is acceptable; reading the full
/// stream first means an aborted transfer never reaches the store.
async fn collect_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, String> {
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(err.to_string()),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let media_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|err| err.to_string())?;
        files.push(UploadedFile {
            original_name,
            media_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

fn upload_response<S>(
    files: Result<Vec<UploadedFile>, String>,
    gate: &UploadGate<S>,
) -> Response
where
    S: ObjectStore,
{
    let files = match files {
        Ok(files) => files,
        Err(detail) => {
            let payload = json!({ "error": format!("malformed multipart request: {detail}") });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match gate.receive(files) {
        Ok(handle) => {
            let payload = json!({ "url": handle.url });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(UploadError::Policy(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
                "violation": violation.code(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(err @ UploadError::Storage(_)) => {
            let payload = json!({
                "error": err.to_string(),
                "retryable": true,
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
