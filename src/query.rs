//! Chat session against the search endpoint.
//!
//! Each [`QuerySession::submit`] runs one exchange:
//!
//! 1. append the user turn (verbatim input) and clear the input,
//! 2. mark the session pending,
//! 3. `POST /search` with `{ query, top_k }`,
//! 4. append exactly one assistant turn: the composed answer on success,
//!    the configured fallback message on any failure,
//! 5. clear the pending mark, whatever happened.
//!
//! Only one exchange runs at a time, so turns always alternate
//! user/assistant in call order.

use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::busy::BusyFlag;
use crate::client::Backend;
use crate::config::QueryConfig;
use crate::models::{ChatRole, ChatTurn, SearchRequest, SearchResponse, SourceCitation};

/// Placed between the answer and the citation list.
pub const SOURCES_SEPARATOR: &str = "\n\n---\n📑 參考來源：\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend answered; one assistant turn was appended.
    Answered,
    /// The call failed; the fallback turn was appended.
    Failed,
    /// Input was empty or whitespace; nothing happened.
    Empty,
    /// Another query is outstanding; nothing happened.
    Busy,
}

#[derive(Debug)]
struct Conversation {
    transcript: Vec<ChatTurn>,
    input: String,
}

pub struct QuerySession {
    backend: Arc<dyn Backend>,
    top_k: u32,
    fallback_message: String,
    conversation: Mutex<Conversation>,
    pending: BusyFlag,
}

impl QuerySession {
    /// New session whose transcript holds only the greeting.
    pub fn new(backend: Arc<dyn Backend>, config: &QueryConfig) -> Self {
        Self {
            backend,
            top_k: config.top_k,
            fallback_message: config.fallback_message.clone(),
            conversation: Mutex::new(Conversation {
                transcript: vec![ChatTurn::assistant(config.greeting.clone())],
                input: String::new(),
            }),
            pending: BusyFlag::default(),
        }
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Replace the input buffer (the text box contents).
    pub fn set_input(&self, text: impl Into<String>) {
        self.lock().input = text.into();
    }

    pub fn input(&self) -> String {
        self.lock().input.clone()
    }

    /// True while a search request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_set()
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.lock().transcript.clone()
    }

    pub fn last_turn(&self) -> Option<ChatTurn> {
        self.lock().transcript.last().cloned()
    }

    /// Submit the current input.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_pending) = self.pending.try_acquire() else {
            return SubmitOutcome::Busy;
        };

        let query = {
            let mut conv = self.lock();
            if conv.input.trim().is_empty() {
                return SubmitOutcome::Empty;
            }
            let query = std::mem::take(&mut conv.input);
            conv.transcript.push(ChatTurn::user(query.clone()));
            query
        };

        let request = SearchRequest {
            query,
            top_k: self.top_k,
        };
        debug!(top_k = request.top_k, "submitting query");

        let (reply, outcome) = match self.backend.search(&request).await {
            Ok(response) => (compose_answer(&response), SubmitOutcome::Answered),
            Err(e) => {
                warn!(error = %e, "search failed");
                (self.fallback_message.clone(), SubmitOutcome::Failed)
            }
        };
        self.lock().transcript.push(ChatTurn::assistant(reply));

        outcome
    }

    /// Set the input to `text` and submit it.
    pub async fn ask(&self, text: impl Into<String>) -> SubmitOutcome {
        if self.is_pending() {
            return SubmitOutcome::Busy;
        }
        self.set_input(text);
        self.submit().await
    }

    /// Number of user questions asked so far.
    pub fn questions_asked(&self) -> usize {
        self.lock()
            .transcript
            .iter()
            .filter(|t| t.role == ChatRole::User)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Conversation> {
        self.conversation.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Assistant text for a successful search: the answer, then the citation
/// block when there are sources.
pub fn compose_answer(response: &SearchResponse) -> String {
    if response.sources.is_empty() {
        return response.answer.clone();
    }

    let lines: Vec<String> = response
        .sources
        .iter()
        .enumerate()
        .map(|(i, source)| format_citation(i + 1, source))
        .collect();

    format!("{}{}{}", response.answer, SOURCES_SEPARATOR, lines.join("\n"))
}

/// `[index] filename (相似度: NN.N%)`, similarity as a percentage with one decimal.
pub fn format_citation(index: usize, source: &SourceCitation) -> String {
    format!(
        "[{}] {} (相似度: {:.1}%)",
        index,
        source.filename,
        similarity_percent(source.similarity_score)
    )
}

/// Percentage rounded to one decimal, ties away from zero.
///
/// `{:.1}` alone rounds exact ties to even, so 0.5625 would print as 56.2.
fn similarity_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}
