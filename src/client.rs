//! Backend access.
//!
//! The [`Backend`] trait is the seam between the session components and the
//! network: [`HttpBackend`] talks to the real server with `reqwest`, tests
//! substitute scripted implementations.
//!
//! # Endpoints
//!
//! | Method | Path | Request | Response |
//! |--------|------|---------|----------|
//! | `GET`  | `/documents` | — | `[Document]` |
//! | `POST` | `/upload` | multipart, field `file` | [`UploadReceipt`] |
//! | `POST` | `/search` | [`SearchRequest`] | [`SearchResponse`] |
//!
//! No request is retried here. A failed refresh is superseded by the next
//! poll tick; failed uploads and queries are retried by the user.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{Document, SearchRequest, SearchResponse, UploadFile, UploadReceipt};

pub const DOCUMENTS_PATH: &str = "/documents";
pub const UPLOAD_PATH: &str = "/upload";
pub const SEARCH_PATH: &str = "/search";

/// The three operations the dashboard needs from the server.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the full document collection.
    async fn list_documents(&self) -> ClientResult<Vec<Document>>;

    /// Send one file for ingestion.
    async fn upload(&self, file: &UploadFile) -> ClientResult<UploadReceipt>;

    /// Ask a question against the ingested corpus.
    async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse>;
}

/// [`Backend`] over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for the configured origin and timeout.
    pub fn new(config: &BackendConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| ClientError::Transport {
                endpoint: "client",
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_documents(&self) -> ClientResult<Vec<Document>> {
        debug!(url = %self.url(DOCUMENTS_PATH), "GET documents");
        let resp = self
            .client
            .get(self.url(DOCUMENTS_PATH))
            .send()
            .await
            .map_err(transport(DOCUMENTS_PATH))?;
        let resp = ensure_success(DOCUMENTS_PATH, resp).await?;
        decode_json(DOCUMENTS_PATH, resp).await
    }

    async fn upload(&self, file: &UploadFile) -> ClientResult<UploadReceipt> {
        debug!(file = %file.file_name, bytes = file.bytes.len(), "POST upload");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(transport(UPLOAD_PATH))?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(transport(UPLOAD_PATH))?;
        let resp = ensure_success(UPLOAD_PATH, resp).await?;

        // The status code decides success; the body is informational.
        match decode_json::<UploadReceipt>(UPLOAD_PATH, resp).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                debug!(error = %e, "ignoring unreadable upload receipt");
                Ok(UploadReceipt::default())
            }
        }
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse> {
        debug!(top_k = request.top_k, "POST search");
        let resp = self
            .client
            .post(self.url(SEARCH_PATH))
            .json(request)
            .send()
            .await
            .map_err(transport(SEARCH_PATH))?;
        let resp = ensure_success(SEARCH_PATH, resp).await?;
        decode_json(SEARCH_PATH, resp).await
    }
}

fn transport(endpoint: &'static str) -> impl FnOnce(reqwest::Error) -> ClientError {
    move |source| ClientError::Transport { endpoint, source }
}

async fn ensure_success(
    endpoint: &'static str,
    resp: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status {
        endpoint,
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(
    endpoint: &'static str,
    resp: reqwest::Response,
) -> ClientResult<T> {
    let bytes = resp.bytes().await.map_err(transport(endpoint))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
        endpoint,
        message: e.to_string(),
    })
}
