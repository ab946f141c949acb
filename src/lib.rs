//! # ragdesk
//!
//! Terminal dashboard client for a document ingestion and retrieval-augmented
//! question-answering backend.
//!
//! The backend ingests uploaded reports, embeds them and answers questions
//! grounded in them. This crate is the client side: it keeps a cached list of
//! documents in sync by polling, uploads files one at a time, tracks the
//! selected document and runs a chat transcript against the search endpoint.
//!
//! ## Architecture
//!
//! ```text
//!                ┌───────────────────────────────┐
//!                │        DashboardSession        │
//!                │                               │
//!  timer ──────▶ │  Poller ──▶ DocumentRegistry  │◀── Selection
//!                │               ▲               │
//!  user ───────▶ │  UploadCoordinator ──┘        │
//!  user ───────▶ │  QuerySession (transcript)    │
//!                └───────────────┬───────────────┘
//!                                ▼
//!                     Backend (HttpBackend)
//!              GET /documents  POST /upload  POST /search
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ragdesk documents                     # list documents and their status
//! ragdesk upload ./reports/q1.pdf       # upload, then show the refreshed list
//! ragdesk ask "營收表現如何？"            # one question
//! ragdesk chat                          # interactive session with polling
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire and transcript data types |
//! | [`error`] | Backend error taxonomy |
//! | [`client`] | `Backend` trait and HTTP implementation |
//! | [`registry`] | Cached document list with full-replace refresh |
//! | [`poller`] | Repeating refresh with cancellation |
//! | [`upload`] | Single-flight upload coordinator |
//! | [`query`] | Chat transcript and answer formatting |
//! | [`selection`] | Selected document by identity |
//! | [`status`] | Status badge styling |
//! | [`session`] | Session object owning all of the above |
//! | [`commands`] | CLI command implementations |

mod busy;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod query;
pub mod registry;
pub mod selection;
pub mod session;
pub mod status;
pub mod upload;

#[cfg(test)]
mod testing;
