//! Scripted [`Backend`] for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

use crate::client::Backend;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Document, DocumentStatus, SearchRequest, SearchResponse, UploadFile, UploadReceipt,
};

/// Responses are popped from per-endpoint queues. An empty document queue
/// falls back to the last list set with [`ScriptedBackend::set_documents`];
/// empty upload/search queues succeed with a default body.
///
/// When gated, every call waits for a permit from [`ScriptedBackend::release`]
/// before answering, which lets tests observe in-flight state.
#[derive(Default)]
pub struct ScriptedBackend {
    documents: Mutex<VecDeque<ClientResult<Vec<Document>>>>,
    fallback_documents: Mutex<Vec<Document>>,
    uploads: Mutex<VecDeque<ClientResult<UploadReceipt>>>,
    searches: Mutex<VecDeque<ClientResult<SearchResponse>>>,
    pub list_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub search_requests: Mutex<Vec<SearchRequest>>,
    gate: Option<Semaphore>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn set_documents(&self, docs: Vec<Document>) {
        *self.fallback_documents.lock().unwrap() = docs;
    }

    pub fn push_documents(&self, result: ClientResult<Vec<Document>>) {
        self.documents.lock().unwrap().push_back(result);
    }

    pub fn push_upload(&self, result: ClientResult<UploadReceipt>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn push_search(&self, result: ClientResult<SearchResponse>) {
        self.searches.lock().unwrap().push_back(result);
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn list_documents(&self) -> ClientResult<Vec<Document>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        let next = self.documents.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => Ok(self.fallback_documents.lock().unwrap().clone()),
        }
    }

    async fn upload(&self, _file: &UploadFile) -> ClientResult<UploadReceipt> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        let next = self.uploads.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(UploadReceipt::default()))
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_requests.lock().unwrap().push(request.clone());
        self.wait_gate().await;
        let next = self.searches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(SearchResponse {
                answer: format!("echo: {}", request.query),
                sources: Vec::new(),
            })
        })
    }
}

pub fn doc(id: &str, name: &str, status: &str) -> Document {
    Document {
        id: id.to_string(),
        name: name.to_string(),
        status: DocumentStatus::from(status),
        date: "2024-03-01 09:30".to_string(),
    }
}

pub fn server_error(endpoint: &'static str) -> ClientError {
    ClientError::Status {
        endpoint,
        status: 500,
        body: "internal".to_string(),
    }
}

pub fn sample_file() -> UploadFile {
    UploadFile {
        file_name: "q1.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4".to_vec(),
    }
}
