use serde::{Deserialize, Serialize};

use super::http::AiServiceHttp;
use super::StageError;
use crate::models::SourceItem;
use crate::pipeline::types::{CallContext, SafeText};

/// Evidence retrieval collaborator.
pub trait EvidenceRetriever: Send + Sync {
    fn retrieve(&self, text: &SafeText, ctx: &CallContext) -> Result<RetrievalResponse, StageError>;
}

#[derive(Serialize)]
struct RetrievalRequest<'a> {
    text: &'a str,
}

/// One piece of retrieved evidence: a bare excerpt or a cited source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Snippet {
    Text(String),
    Source(SourceItem),
}

impl Snippet {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Source(item) => &item.snippet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetrievalResponse {
    #[serde(alias = "relevant_sources")]
    pub relevant_snippets: Vec<Snippet>,
}

/// HTTP client for `POST /retrieve`.
#[derive(Clone)]
pub struct RetrievalClient {
    http: AiServiceHttp,
}

impl RetrievalClient {
    pub fn new(http: AiServiceHttp) -> Self {
        Self { http }
    }
}

impl EvidenceRetriever for RetrievalClient {
    fn retrieve(&self, text: &SafeText, ctx: &CallContext) -> Result<RetrievalResponse, StageError> {
        let body = RetrievalRequest {
            text: text.as_str(),
        };
        self.http.post_json("/retrieve", &body, ctx)
    }
}
