//! In-process mock of the ingestion/search backend.
//!
//! Mirrors the real server's wire format: integer document ids, `pending`
//! status for fresh uploads, `%Y-%m-%d %H:%M` dates.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct MockBackend {
    pub documents: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<ReceivedFile>>,
    pub searches: Mutex<Vec<Value>>,
    /// Body returned by `/search`; `None` answers 500.
    pub search_reply: Mutex<Option<Value>>,
    /// When set, `/documents` answers 503.
    pub documents_down: Mutex<bool>,
    /// When set, `/upload` answers 500.
    pub upload_down: Mutex<bool>,
}

impl MockBackend {
    pub fn with_documents(docs: Vec<Value>) -> Arc<Self> {
        let mock = Arc::new(Self::default());
        *mock.documents.lock().unwrap() = docs;
        mock
    }

    pub fn reply_to_search(&self, body: Value) {
        *self.search_reply.lock().unwrap() = Some(body);
    }
}

pub fn document(id: i64, name: &str, status: &str) -> Value {
    json!({ "id": id, "name": name, "status": status, "date": "2024-03-01 09:30" })
}

async fn list_documents(
    State(mock): State<Arc<MockBackend>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    if *mock.documents_down.lock().unwrap() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(mock.documents.lock().unwrap().clone()))
}

async fn upload(
    State(mock): State<Arc<MockBackend>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, String)> {
    if *mock.upload_down.lock().unwrap() {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable".to_string()));
    }

    let mut received = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        received = Some(ReceivedFile {
            field: name,
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    let file = received.ok_or((StatusCode::UNPROCESSABLE_ENTITY, "file missing".to_string()))?;

    let doc_id = {
        let mut docs = mock.documents.lock().unwrap();
        let id = docs.len() as i64 + 1;
        docs.insert(0, document(id, &file.file_name, "pending"));
        id
    };
    let file_name = file.file_name.clone();
    mock.uploads.lock().unwrap().push(file);

    Ok(Json(json!({ "status": "success", "doc_id": doc_id, "filename": file_name })))
}

async fn search(
    State(mock): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    mock.searches.lock().unwrap().push(body);
    match mock.search_reply.lock().unwrap().clone() {
        Some(reply) => Ok(Json(reply)),
        None => Err((StatusCode::INTERNAL_SERVER_ERROR, "ollama unreachable".to_string())),
    }
}

/// Serve `mock` on an ephemeral localhost port; returns the base URL.
pub async fn spawn(mock: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/documents", get(list_documents))
        .route("/upload", post(upload))
        .route("/search", post(search))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
