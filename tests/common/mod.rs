//! Shared fixtures for the API tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use file_gateway::{AppState, Config};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "file-gateway-test-boundary";

/// Fixture files under `docs/`: (name, contents, age in seconds).
pub const DOCS: &[(&str, &str, u64)] = &[
    ("doc1.txt", "test document 1\n", 400),
    ("doc2.txt", "b\n", 300),
    ("doc3.txt", "doc three\n", 200),
    ("newdoc.txt", "a newer, longer document\n", 100),
];

/// Router over a temporary base directory populated with the fixture tree.
///
/// The `TempDir` must be kept alive for as long as the router is used.
pub fn test_app() -> (Router, TempDir) {
    test_app_with_config(Config::default())
}

pub fn test_app_with_config(config: Config) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    populate(temp_dir.path());

    let state = AppState::with_config(temp_dir.path().to_path_buf(), config);
    (file_gateway::router(state), temp_dir)
}

fn populate(root: &Path) {
    let docs = root.join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();

    let now = SystemTime::now();
    for (name, contents, age) in DOCS {
        let path = docs.join(name);
        fs::write(&path, contents).unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(now - Duration::from_secs(*age)).unwrap();
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

/// Multipart request carrying `data` in a field called `field`.
pub fn multipart_request(method: Method, uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .uri(uri)
        .method(method)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn upload(uri: &str, data: &[u8]) -> Request<Body> {
    multipart_request(Method::POST, uri, "file", data)
}

pub fn update(uri: &str, data: &[u8]) -> Request<Body> {
    multipart_request(Method::PATCH, uri, "file", data)
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap()
}
