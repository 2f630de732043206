use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;
use tower::util::ServiceExt;
use tryonx_api::{AppConfig, AppState, PlaceholderEngine, create_router, models::UploadResponse};

const BOUNDARY: &str = "tryonx-test-boundary";

fn app_with_limit(max_upload_bytes: usize) -> axum::Router {
    let config = AppConfig {
        max_upload_bytes,
        ..AppConfig::default()
    };
    create_router(AppState::new(config, Arc::new(PlaceholderEngine::new())))
}

fn app() -> axum::Router {
    app_with_limit(AppConfig::default().max_upload_bytes)
}

/// A single multipart part. `filename` and `content_type` are optional so the
/// malformed cases can be built too.
struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content_type: Option<&'a str>,
    data: &'a [u8],
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn read_upload_response(response: axum::response::Response) -> UploadResponse {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_upload_success() {
    let response = app()
        .oneshot(upload_request(&[Part {
            name: "file",
            filename: Some("swatch.png"),
            content_type: Some("image/png"),
            data: b"\x89PNG\r\n\x1a\nfake",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_upload_response(response).await;
    assert_eq!(body.status, "success");
    assert!(body.file_url.contains("swatch.png"));
    assert_eq!(body.file_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_upload_ignores_other_fields() {
    let response = app()
        .oneshot(upload_request(&[
            Part {
                name: "note",
                filename: None,
                content_type: None,
                data: b"front view",
            },
            Part {
                name: "file",
                filename: Some("sketch.jpg"),
                content_type: Some("image/jpeg"),
                data: b"jpeg-bytes",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_upload_response(response).await;
    assert!(body.file_url.ends_with("/sketch.jpg"));
}

#[tokio::test]
async fn test_upload_filename_sanitization() {
    let response = app()
        .oneshot(upload_request(&[Part {
            name: "file",
            filename: Some("../../etc/passwd.png"),
            content_type: Some("image/png"),
            data: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_upload_response(response).await;
    assert!(body.file_url.ends_with("/passwd.png"));
    assert!(!body.file_url.contains(".."));
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let response = app()
        .oneshot(upload_request(&[Part {
            name: "note",
            filename: None,
            content_type: None,
            data: b"no file here",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_without_filename() {
    let response = app()
        .oneshot(upload_request(&[Part {
            name: "file",
            filename: Some(".."),
            content_type: Some("image/png"),
            data: b"data",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit() {
    let payload = vec![0u8; 4096];
    let response = app_with_limit(1024)
        .oneshot(upload_request(&[Part {
            name: "file",
            filename: Some("huge.png"),
            content_type: Some("image/png"),
            data: &payload,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
