//! Wire and session data types.
//!
//! [`Document`], [`SearchRequest`], [`SearchResponse`], [`SourceCitation`]
//! and [`UploadReceipt`] mirror the backend's JSON. [`ChatTurn`] is the
//! client-side transcript entry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Format the backend uses for [`Document::date`].
pub const DOCUMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Ingestion state of a document, as reported by the server.
///
/// Unrecognized values are kept verbatim so newer servers keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Unknown(String),
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
            DocumentStatus::Unknown(s) => s,
        }
    }

    /// True once the server will no longer change this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }
}

impl From<String> for DocumentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => DocumentStatus::Pending,
            "processing" => DocumentStatus::Processing,
            "completed" => DocumentStatus::Completed,
            "failed" => DocumentStatus::Failed,
            _ => DocumentStatus::Unknown(s),
        }
    }
}

impl From<&str> for DocumentStatus {
    fn from(s: &str) -> Self {
        DocumentStatus::from(s.to_string())
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server-tracked report, as returned by `GET /documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier. The backend sends an integer; strings are accepted too.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub status: DocumentStatus,
    /// Upload timestamp, display-only.
    #[serde(default)]
    pub date: String,
}

impl Document {
    /// Parse [`date`](Document::date) when it has the backend's usual format.
    pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DOCUMENT_DATE_FORMAT).ok()
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: u32,
}

/// A retrieved passage backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub filename: String,
    /// Matched chunk text, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Cosine similarity in `[0, 1]`.
    pub similarity_score: f64,
}

/// Body returned by `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
}

/// Body returned by `POST /upload`. Only logged; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

/// A file to be sent to `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}
