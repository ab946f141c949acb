//! One-at-a-time file upload.
//!
//! A successful upload triggers an immediate registry refresh instead of
//! waiting for the next poll tick. If a poll fetch is already outstanding,
//! that refresh waits for it and fetches again. The new document shows up
//! (usually as `pending`) through that refresh, never synchronously.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::busy::BusyFlag;
use crate::client::Backend;
use crate::error::{ClientError, ClientResult};
use crate::models::{UploadFile, UploadReceipt};
use crate::registry::{DocumentRegistry, RefreshOutcome};

/// Text shown to the user when an upload fails.
pub const UPLOAD_FAILED_NOTICE: &str = "Upload failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No file was chosen; nothing was sent.
    NoFile,
    /// Another upload is still in flight; nothing was sent.
    Busy,
    /// The server accepted the file.
    Uploaded {
        receipt: UploadReceipt,
        refresh: RefreshOutcome,
    },
}

/// A failed upload. Meant to be shown as a blocking notice; never retried.
#[derive(Debug, Error)]
#[error("Upload failed: {file_name}")]
pub struct UploadError {
    pub file_name: String,
    #[source]
    pub source: ClientError,
}

impl UploadError {
    pub fn notice(&self) -> &'static str {
        UPLOAD_FAILED_NOTICE
    }
}

pub struct UploadCoordinator {
    backend: Arc<dyn Backend>,
    registry: Arc<DocumentRegistry>,
    in_flight: BusyFlag,
}

impl UploadCoordinator {
    pub fn new(backend: Arc<dyn Backend>, registry: Arc<DocumentRegistry>) -> Self {
        Self {
            backend,
            registry,
            in_flight: BusyFlag::default(),
        }
    }

    /// While true, further uploads are rejected with [`UploadOutcome::Busy`].
    pub fn is_uploading(&self) -> bool {
        self.in_flight.is_set()
    }

    pub async fn upload(&self, file: Option<&UploadFile>) -> Result<UploadOutcome, UploadError> {
        let Some(file) = file else {
            return Ok(UploadOutcome::NoFile);
        };
        let Some(_guard) = self.in_flight.try_acquire() else {
            return Ok(UploadOutcome::Busy);
        };

        match self.backend.upload(file).await {
            Ok(receipt) => {
                info!(
                    file = %file.file_name,
                    doc_id = receipt.doc_id.as_deref().unwrap_or("?"),
                    "upload accepted"
                );
                let refresh = self.registry.refresh_now().await;
                Ok(UploadOutcome::Uploaded { receipt, refresh })
            }
            Err(source) => {
                warn!(file = %file.file_name, error = %source, "upload failed");
                Err(UploadError {
                    file_name: file.file_name.clone(),
                    source,
                })
            }
        }
    }
}

impl UploadFile {
    /// Read `path` into memory, naming the part after the file's base name.
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = guess_mime(&file_name).to_string();

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}
