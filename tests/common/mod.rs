//! Stub of the BK backend for integration tests.
//!
//! Serves the same routes as the real API with canned data and records
//! every request (method, path, raw query, `Authorization` header) so tests
//! can assert on what the client sent.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "demo@example.com";
pub const PASSWORD: &str = "demo1234";
pub const TOKEN: &str = "tok-demo-1";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct Backend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    json_bodies: Arc<Mutex<Vec<(String, Value)>>>,
    uploads: Arc<Mutex<Vec<Upload>>>,
    users: Arc<Mutex<Vec<String>>>,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            json_bodies: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            users: Arc::new(Mutex::new(vec![EMAIL.to_string()])),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn last(&self, path: &str) -> Option<Recorded> {
        self.requests().into_iter().rev().find(|r| r.path == path)
    }

    /// Last JSON body posted to `path`.
    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.json_bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    fn keep_body(&self, path: &str, body: &Value) {
        self.json_bodies
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
    }
}

pub fn router(backend: Backend) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plain", get(|| async { "pong" }))
        .route(
            "/plain-json",
            get(|| async { ([(header::CONTENT_TYPE, "text/plain")], r#"{"a":1}"#) }),
        )
        .route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
        )
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
        .route("/api/documents/upload", post(upload))
        .route("/api/documents", get(list_documents))
        .route(
            "/api/documents/{id}",
            get(get_document).delete(delete_document),
        )
        .route("/api/search", get(search))
        .route("/api/knowledge/ask", post(ask))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

/// Serve on an ephemeral port inside the current tokio runtime.
pub async fn spawn(backend: Backend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(backend)).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serve on an ephemeral port from a dedicated thread, for tests that run
/// the `bkh` binary.
pub fn spawn_in_thread(backend: Backend) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tx.send(format!("http://{}", addr)).unwrap();
            axum::serve(listener, router(backend)).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

async fn record(State(backend): State<Backend>, req: Request, next: Next) -> Response {
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    backend.requests.lock().unwrap().push(recorded);
    next.run(req).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Document not found"})),
    )
        .into_response()
}

fn fixture_documents() -> Vec<Value> {
    vec![
        json!({
            "id": 2,
            "filename": "menu.pdf",
            "size": 2048,
            "mime_type": "application/pdf",
            "created_at": "2025-01-02T10:00:00",
            "has_text": true
        }),
        json!({
            "id": 1,
            "filename": "scan.png",
            "size": 1536,
            "mime_type": "image/png",
            "created_at": "2025-01-01T09:00:00",
            "has_text": false
        }),
    ]
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn register(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    backend.keep_body("/api/auth/register", &body);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let mut users = backend.users.lock().unwrap();
    if users.contains(&email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "Email already registered"})),
        )
            .into_response();
    }
    users.push(email.clone());
    (
        StatusCode::CREATED,
        Json(json!({"id": users.len(), "email": email})),
    )
        .into_response()
}

async fn login(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    backend.keep_body("/api/auth/login", &body);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let known = backend.users.lock().unwrap().contains(&email);
    if known && body["password"] == PASSWORD {
        Json(json!({"access_token": TOKEN, "token_type": "bearer"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn profile(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"id": 1, "email": EMAIL, "role": "user"})).into_response()
}

async fn upload(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut last = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content = field.bytes().await.unwrap().to_vec();
        let upload = Upload {
            field: name,
            filename,
            content,
        };
        backend.uploads.lock().unwrap().push(upload.clone());
        last = Some(upload);
    }
    let Some(upload) = last else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "file missing"})),
        )
            .into_response();
    };
    Json(json!({
        "id": 7,
        "filename": upload.filename,
        "size": upload.content.len(),
        "mime_type": "text/plain",
        "ingested_chunks": 1
    }))
    .into_response()
}

async fn list_documents(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let docs: Vec<Value> = fixture_documents()
        .into_iter()
        .filter(|d| match params.get("q") {
            Some(q) => d["filename"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&q.to_lowercase()),
            None => true,
        })
        .collect();
    Json(Value::Array(docs)).into_response()
}

async fn get_document(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 2 {
        return not_found();
    }
    Json(json!({
        "id": 2,
        "filename": "menu.pdf",
        "size": 2048,
        "mime_type": "application/pdf",
        "created_at": "2025-01-02T10:00:00",
        "metadata": {"original_name": "menu.pdf"},
        "preview": "BEAN & BREW COFFEE SHOP\nServer: Alex\nOat latte 4.50…"
    }))
    .into_response()
}

async fn delete_document(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 2 {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "query": params.get("q"),
        "documents": [{
            "document_id": 2,
            "filename": "menu.pdf",
            "document_created_at": "2025-01-02T10:00:00",
            "best_score": 0.8123,
            "total_matches": 3,
            "snippets": [
                {"chunk_index": 0, "score": 0.8123, "snippet": "Oat latte 4.50"}
            ]
        }]
    }))
    .into_response()
}

async fn ask(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.keep_body("/api/knowledge/ask", &body);
    Json(json!({
        "answer": "The server is Alex.",
        "citations": [{
            "document_id": 2,
            "filename": "menu.pdf",
            "chunk_index": 0,
            "score": 0.71,
            "snippet": "Server: Alex"
        }]
    }))
    .into_response()
}
