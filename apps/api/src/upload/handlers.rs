//! Axum route handlers for the resume upload relay.

use std::path::Path;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use crate::state::AppState;
use crate::upload::relay::relay_resume;
use crate::upload::storage::StoredUpload;
use crate::upload::validator::{storage_extension, validate_size, validate_type};

/// Multipart field carrying the resume.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: ParsedResume,
}

/// POST /api/upload
///
/// Validates the `resume` part, stores it, relays it to the parser and
/// returns the extracted fields. The stored file never outlives the request.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::MissingFile)?;
    let upload = accept_resume(&mut multipart, &state.config.upload_dir).await?;

    info!(
        file_name = upload.file_name(),
        size = upload.size(),
        format = ?upload.format(),
        "Relaying resume to parser"
    );

    let data = relay_resume(state.ml.as_ref(), upload)
        .await
        .map_err(|e| AppError::UpstreamParseFailure {
            detail: state.config.error_detail(&e),
        })?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Resume parsed successfully",
        data,
    }))
}

/// Finds the resume part, validates it and stores it. Type is checked before
/// any content is read; size is checked while reading, before storage.
async fn accept_resume(multipart: &mut Multipart, dir: &Path) -> Result<StoredUpload, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        // Parts without a filename are plain form fields, not files.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let format = validate_type(field.content_type(), Some(file_name.as_str()))?;
        let content = read_capped(&mut field).await?;
        let extension = storage_extension(Some(file_name.as_str()), format);

        return StoredUpload::materialize(dir, file_name, format, extension, content)
            .await
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("failed to store upload")));
    }

    Err(AppError::MissingFile)
}

async fn read_capped(field: &mut Field<'_>) -> Result<Bytes, AppError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        validate_size(buffer.len() + chunk.len())?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::FileTooLarge;
    }
    AppError::InvalidRequest {
        message: "File upload failed".to_string(),
        detail: Some(err.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Environment;
    use crate::routes::build_router;
    use crate::testing::{multipart_body, read_json, test_state, FakeMl, BOUNDARY};
    use crate::upload::validator::MAX_UPLOAD_BYTES;

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn dir_is_empty(dir: &std::path::Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_pdf_upload_returns_parsed_data_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let body = multipart_body("resume", "cv.pdf", "application/pdf", b"%PDF-1.4 hello");
        let response = router.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Resume parsed successfully");
        assert_eq!(json["data"]["skills"][0], "Rust");

        let seen = ml.seen_uploads();
        assert_eq!(seen.len(), 1, "exactly one temporary file is created");
        let (path, existed_during_call) = &seen[0];
        assert!(existed_during_call);
        assert!(!path.exists());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_parse_failure_returns_500_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::failing(503));
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let body = multipart_body("resume", "cv.docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document", b"PK\x03\x04");
        let response = router.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = read_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Failed to parse resume. Please try again.");
        assert!(json.get("error").is_none());

        assert_eq!(ml.parse_calls.load(Ordering::SeqCst), 1);
        assert!(!ml.seen_uploads()[0].0.exists());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_parse_failure_exposes_detail_in_development() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::failing(503));
        let router = build_router(test_state(ml, dir.path(), Environment::Development));

        let body = multipart_body("resume", "cv.pdf", "application/pdf", b"%PDF");
        let response = router.oneshot(upload_request(body)).await.unwrap();

        let json = read_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_rejected_type_creates_no_file_and_skips_parser() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let body = multipart_body("resume", "photo.png", "image/png", b"\x89PNG");
        let response = router.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(
            json["message"],
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed."
        );
        assert_eq!(ml.parse_calls.load(Ordering::SeqCst), 0);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected_without_parser_call() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let content = vec![b'a'; MAX_UPLOAD_BYTES + 1];
        let body = multipart_body("resume", "big.pdf", "application/pdf", &content);
        let response = router.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["message"], "File too large. Maximum size is 10MB.");
        assert_eq!(ml.parse_calls.load(Ordering::SeqCst), 0);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_file_at_exact_cap_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let content = vec![b'a'; MAX_UPLOAD_BYTES];
        let body = multipart_body("resume", "exact.pdf", "application/pdf", &content);
        let response = router.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ml.parse_calls.load(Ordering::SeqCst), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_missing_resume_field_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let body = multipart_body("attachment", "cv.pdf", "application/pdf", b"%PDF");
        let response = router.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["message"], "No file uploaded");
        assert_eq!(ml.parse_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resume_text_field_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml.clone(), dir.path(), Environment::Production));

        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"resume\"\r\n\r\n\
             just some text\r\n\
             --{BOUNDARY}--\r\n"
        );
        let response = router.oneshot(upload_request(body.into_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["message"], "No file uploaded");
        assert_eq!(ml.parse_calls.load(Ordering::SeqCst), 0);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let ml = Arc::new(FakeMl::healthy());
        let router = build_router(test_state(ml, dir.path(), Environment::Production));

        let request = Request::post("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["message"], "No file uploaded");
    }
}
