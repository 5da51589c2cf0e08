//! HTTP-level tests for the multipart upload endpoints: the server-side
//! enforcement of the file constraint policies and the durable-store
//! boundary behavior.

mod common {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use hireboard::storage::{
        upload_router, ContentKind, ObjectStore, RetrievalHandle, StorageError, UploadGates,
    };

    /// In-memory object store so tests can assert exactly what was
    /// persisted.
    #[derive(Default)]
    pub struct MemoryStore {
        objects: Mutex<BTreeMap<String, (ContentKind, Vec<u8>)>>,
        unavailable: bool,
    }

    impl MemoryStore {
        pub fn broken() -> Self {
            Self {
                objects: Mutex::new(BTreeMap::new()),
                unavailable: true,
            }
        }

        pub fn object_count(&self) -> usize {
            self.objects.lock().expect("store mutex poisoned").len()
        }
    }

    impl ObjectStore for MemoryStore {
        fn put(
            &self,
            bytes: &[u8],
            kind: ContentKind,
            key: &str,
        ) -> Result<RetrievalHandle, StorageError> {
            if self.unavailable {
                return Err(StorageError::Unavailable("connection refused".to_string()));
            }
            let mut guard = self.objects.lock().expect("store mutex poisoned");
            guard.insert(key.to_string(), (kind, bytes.to_vec()));
            Ok(RetrievalHandle::new(format!(
                "mem://{}/{key}",
                kind.segment()
            )))
        }
    }

    pub fn upload_app(store: Arc<MemoryStore>) -> Router {
        upload_router(UploadGates::new(store))
    }

    pub const BOUNDARY: &str = "hireboard-test-boundary";

    pub struct Part {
        pub field: &'static str,
        pub file_name: &'static str,
        pub content_type: &'static str,
        pub bytes: Vec<u8>,
    }

    /// Hand-rolled multipart encoding so the tests control the exact wire
    /// shape (field names, part counts, declared types).
    pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.field, part.file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(
                format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes(),
            );
            body.extend_from_slice(&part.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::Value;
use tower::ServiceExt;

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

fn pdf_part(size: usize) -> Part {
    Part {
        field: "file",
        file_name: "resume.pdf",
        content_type: "application/pdf",
        bytes: vec![b'a'; size],
    }
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[tokio::test]
async fn accepts_valid_resume_and_returns_handle() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    let body = multipart_body(&[pdf_part(4 * 1024 * 1024)]);
    let response = app
        .oneshot(upload_request("/api/v1/uploads/resume", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let url = payload["url"].as_str().expect("handle url");
    assert!(url.starts_with("mem://documents/"));
    assert!(url.ends_with("resume.pdf"));
    assert_eq!(store.object_count(), 1);
}

#[tokio::test]
async fn rejects_six_mib_pdf_with_too_large_and_stores_nothing() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    let body = multipart_body(&[pdf_part(6 * 1024 * 1024)]);
    let response = app
        .oneshot(upload_request("/api/v1/uploads/resume", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["violation"], "too_large");
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn rejects_non_pdf_resume_naming_the_type() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    let body = multipart_body(&[Part {
        field: "file",
        file_name: "resume.docx",
        content_type: "application/msword",
        bytes: vec![b'a'; 1024],
    }]);
    let response = app
        .oneshot(upload_request("/api/v1/uploads/resume", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["violation"], "unsupported_type");
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("application/msword"));
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn rejects_request_without_file_field() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    // A part arrives, but not under the expected field name.
    let body = multipart_body(&[Part {
        field: "attachment",
        file_name: "resume.pdf",
        content_type: "application/pdf",
        bytes: vec![b'a'; 1024],
    }]);
    let response = app
        .oneshot(upload_request("/api/v1/uploads/resume", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["violation"], "missing_file");
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn rejects_two_files_under_the_same_field() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    let body = multipart_body(&[pdf_part(1024), pdf_part(1024)]);
    let response = app
        .oneshot(upload_request("/api/v1/uploads/resume", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["violation"], "multiple_files");
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn logo_endpoint_enforces_image_policy() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    // A PDF is not an acceptable logo.
    let body = multipart_body(&[pdf_part(1024)]);
    let response = app
        .clone()
        .oneshot(upload_request("/api/v1/uploads/logo", body))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // A small PNG is.
    let body = multipart_body(&[Part {
        field: "file",
        file_name: "logo.png",
        content_type: "image/png",
        bytes: vec![b'p'; 100 * 1024],
    }]);
    let response = app
        .clone()
        .oneshot(upload_request("/api/v1/uploads/logo", body))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload["url"]
        .as_str()
        .expect("handle url")
        .starts_with("mem://images/"));

    // Logos over 500 KiB are refused even though resumes that size pass.
    let body = multipart_body(&[Part {
        field: "file",
        file_name: "logo.png",
        content_type: "image/png",
        bytes: vec![b'p'; 600 * 1024],
    }]);
    let response = app
        .oneshot(upload_request("/api/v1/uploads/logo", body))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["violation"], "too_large");
}

#[tokio::test]
async fn duplicate_names_receive_distinct_handles() {
    let store = Arc::new(MemoryStore::default());
    let app = upload_app(store.clone());

    let first = app
        .clone()
        .oneshot(upload_request(
            "/api/v1/uploads/resume",
            multipart_body(&[pdf_part(2048)]),
        ))
        .await
        .expect("route executes");
    let second = app
        .oneshot(upload_request(
            "/api/v1/uploads/resume",
            multipart_body(&[pdf_part(2048)]),
        ))
        .await
        .expect("route executes");

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);
    let first_url = read_json_body(first).await["url"]
        .as_str()
        .expect("first url")
        .to_string();
    let second_url = read_json_body(second).await["url"]
        .as_str()
        .expect("second url")
        .to_string();
    assert_ne!(first_url, second_url);
    assert_eq!(store.object_count(), 2);
}

#[tokio::test]
async fn storage_outage_returns_retryable_503() {
    let app = upload_app(Arc::new(MemoryStore::broken()));

    let response = app
        .oneshot(upload_request(
            "/api/v1/uploads/resume",
            multipart_body(&[pdf_part(1024)]),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload["retryable"], true);
}

#[tokio::test]
async fn malformed_multipart_is_a_bad_request() {
    let app = upload_app(Arc::new(MemoryStore::default()));

    let response = app
        .oneshot(
            Request::post("/api/v1/uploads/resume")
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=b")
                .body(Body::from("this is not multipart at all"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
