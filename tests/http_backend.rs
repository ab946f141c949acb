mod common;

use common::{document, spawn, MockBackend};
use ragdesk::client::{Backend, HttpBackend};
use ragdesk::config::{BackendConfig, Config};
use ragdesk::error::ClientError;
use ragdesk::models::{ChatRole, DocumentStatus, SearchRequest, UploadFile};
use ragdesk::query::SubmitOutcome;
use ragdesk::registry::RefreshOutcome;
use ragdesk::session::DashboardSession;
use ragdesk::upload::UploadOutcome;
use serde_json::json;
use std::sync::Arc;

fn backend_for(base_url: &str) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn config_for(base_url: &str) -> Config {
    let mut cfg = Config::minimal();
    cfg.backend.base_url = base_url.to_string();
    cfg.backend.timeout_secs = 5;
    cfg
}

fn pdf(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        mime_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4 test".to_vec(),
    }
}

#[tokio::test]
async fn lists_documents_from_server() {
    let mock = MockBackend::with_documents(vec![
        document(2, "q2.pdf", "processing"),
        document(1, "q1.pdf", "completed"),
    ]);
    let url = spawn(mock).await;

    let docs = backend_for(&url).list_documents().await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "2");
    assert_eq!(docs[0].status, DocumentStatus::Processing);
    assert_eq!(docs[1].name, "q1.pdf");
    assert!(docs[1].uploaded_at().is_some());
}

#[tokio::test]
async fn list_failure_is_a_status_error() {
    let mock = MockBackend::with_documents(vec![]);
    *mock.documents_down.lock().unwrap() = true;
    let url = spawn(mock).await;

    let err = backend_for(&url).list_documents().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503, .. }));
}

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let mock = MockBackend::with_documents(vec![]);
    let url = spawn(mock.clone()).await;

    let receipt = backend_for(&url).upload(&pdf("annual.pdf")).await.unwrap();
    assert_eq!(receipt.status.as_deref(), Some("success"));
    assert_eq!(receipt.doc_id.as_deref(), Some("1"));

    let uploads = mock.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, "file");
    assert_eq!(uploads[0].file_name, "annual.pdf");
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].bytes, b"%PDF-1.4 test");
}

#[tokio::test]
async fn search_sends_query_and_top_k() {
    let mock = MockBackend::with_documents(vec![]);
    mock.reply_to_search(json!({
        "answer": "Revenue grew 5%",
        "sources": [{ "filename": "q1.pdf", "content": "...", "similarity_score": 0.873 }]
    }));
    let url = spawn(mock.clone()).await;

    let resp = backend_for(&url)
        .search(&SearchRequest {
            query: "How did revenue do?".to_string(),
            top_k: 3,
        })
        .await
        .unwrap();
    assert_eq!(resp.answer, "Revenue grew 5%");
    assert_eq!(resp.sources[0].filename, "q1.pdf");

    let sent = mock.searches.lock().unwrap().clone();
    assert_eq!(sent, vec![json!({ "query": "How did revenue do?", "top_k": 3 })]);
}

#[tokio::test]
async fn malformed_search_body_is_a_decode_error() {
    let mock = MockBackend::with_documents(vec![]);
    mock.reply_to_search(json!({ "unexpected": true }));
    let url = spawn(mock).await;

    let err = backend_for(&url)
        .search(&SearchRequest {
            query: "q".to_string(),
            top_k: 3,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode { endpoint: "/search", .. }));
}

#[tokio::test]
async fn upload_then_refresh_shows_pending_document() {
    let mock = MockBackend::with_documents(vec![document(1, "old.pdf", "completed")]);
    let url = spawn(mock).await;
    let session = DashboardSession::connect(config_for(&url)).unwrap();

    assert_eq!(session.refresh().await, RefreshOutcome::Updated { count: 1 });
    let outcome = session.uploads().upload(Some(&pdf("new.pdf"))).await.unwrap();
    assert!(matches!(
        outcome,
        UploadOutcome::Uploaded {
            refresh: RefreshOutcome::Updated { count: 2 },
            ..
        }
    ));

    let docs = session.registry().documents();
    assert_eq!(docs[0].name, "new.pdf");
    assert_eq!(docs[0].status, DocumentStatus::Pending);
}

#[tokio::test]
async fn failed_upload_reports_notice_without_refresh() {
    let mock = MockBackend::with_documents(vec![document(1, "old.pdf", "completed")]);
    *mock.upload_down.lock().unwrap() = true;
    let url = spawn(mock).await;
    let session = DashboardSession::connect(config_for(&url)).unwrap();

    let err = session.uploads().upload(Some(&pdf("x.pdf"))).await.unwrap_err();
    assert_eq!(err.notice(), "Upload failed");
    assert!(matches!(err.source, ClientError::Status { status: 500, .. }));
    assert_eq!(session.registry().generation(), 0);
    assert!(!session.uploads().is_uploading());
}

#[tokio::test]
async fn chat_round_trip_over_http() {
    let mock = MockBackend::with_documents(vec![]);
    mock.reply_to_search(json!({
        "answer": "Revenue grew 5%",
        "sources": [{ "filename": "q1.pdf", "content": "...", "similarity_score": 0.873 }]
    }));
    let url = spawn(mock.clone()).await;
    let session = DashboardSession::connect(config_for(&url)).unwrap();

    assert_eq!(session.queries().ask("Revenue?").await, SubmitOutcome::Answered);

    // The server goes down: one fallback turn, no duplicate user turn.
    *mock.search_reply.lock().unwrap() = None;
    assert_eq!(session.queries().ask("Margins?").await, SubmitOutcome::Failed);

    let transcript = session.queries().transcript();
    let roles: Vec<ChatRole> = transcript.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant
        ]
    );
    assert_eq!(
        transcript[2].text,
        "Revenue grew 5%\n\n---\n📑 參考來源：\n[1] q1.pdf (相似度: 87.3%)"
    );
    assert_eq!(transcript[4].text, session.config().query.fallback_message);
    assert_eq!(mock.searches.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn registry_survives_backend_outage() {
    let mock = MockBackend::with_documents(vec![document(1, "q1.pdf", "processing")]);
    let url = spawn(mock.clone()).await;
    let session = DashboardSession::new(config_for(&url), Arc::new(backend_for(&url)));

    session.refresh().await;
    let before = session.registry().documents();

    *mock.documents_down.lock().unwrap() = true;
    assert_eq!(session.refresh().await, RefreshOutcome::Failed);
    assert_eq!(session.registry().documents(), before);
    assert!(!session.registry().is_online());

    *mock.documents_down.lock().unwrap() = false;
    *mock.documents.lock().unwrap() = vec![document(1, "q1.pdf", "completed")];
    session.refresh().await;
    assert_eq!(
        session.registry().documents()[0].status,
        DocumentStatus::Completed
    );
    assert!(session.registry().is_online());
}
