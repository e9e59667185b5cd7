//! Clients for the four AI collaborators plus the review callback.
//!
//! Each collaborator sits behind a small trait so the orchestrator can be
//! driven by scripted doubles in tests. The HTTP implementations share one
//! `AiServiceHttp` transport.

pub mod generation;
pub mod http;
pub mod masking;
pub mod retrieval;
pub mod review;
pub mod triage;

pub use generation::*;
pub use http::AiServiceHttp;
pub use masking::*;
pub use retrieval::*;
pub use review::*;
pub use triage::*;

use thiserror::Error;

/// Failure of a single collaborator call.
///
/// Messages never carry request or response bodies: an upstream error
/// page may echo the text it was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("Cannot connect to {0}")]
    Connection(String),

    #[error("Collaborator returned status {status}")]
    Status { status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl StageError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection(_) => "connection",
            Self::Status { .. } => "status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Http(_) => "http",
        }
    }
}
