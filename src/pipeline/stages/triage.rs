use serde::{Deserialize, Serialize};

use super::http::AiServiceHttp;
use super::StageError;
use crate::pipeline::types::{CallContext, SafeText};

/// Triage classification collaborator.
pub trait TriageClassifier: Send + Sync {
    fn classify(&self, text: &SafeText, ctx: &CallContext) -> Result<TriageResponse, StageError>;
}

#[derive(Serialize)]
struct TriageRequest<'a> {
    text: &'a str,
}

/// Category/urgency prediction with confidences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResponse {
    pub category: String,
    #[serde(default)]
    pub category_confidence: Option<f64>,
    pub urgency: String,
    #[serde(default)]
    pub urgency_confidence: Option<f64>,
    #[serde(default)]
    pub needs_human_review: bool,
    #[serde(default)]
    pub review_id: Option<String>,
}

impl TriageResponse {
    /// Reject replies that decode but cannot be used as a classification.
    pub fn validate(self) -> Result<Self, StageError> {
        if self.category.trim().is_empty() {
            return Err(StageError::MalformedResponse("blank category".into()));
        }
        if self.urgency.trim().is_empty() {
            return Err(StageError::MalformedResponse("blank urgency".into()));
        }
        for (field, value) in [
            ("category_confidence", self.category_confidence),
            ("urgency_confidence", self.urgency_confidence),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(StageError::MalformedResponse(format!(
                        "{field} outside [0, 1]"
                    )));
                }
            }
        }
        Ok(self)
    }
}

/// HTTP client for `POST /predict`.
#[derive(Clone)]
pub struct TriageClient {
    http: AiServiceHttp,
}

impl TriageClient {
    pub fn new(http: AiServiceHttp) -> Self {
        Self { http }
    }
}

impl TriageClassifier for TriageClient {
    fn classify(&self, text: &SafeText, ctx: &CallContext) -> Result<TriageResponse, StageError> {
        let body = TriageRequest {
            text: text.as_str(),
        };
        let response: TriageResponse = self.http.post_json("/predict", &body, ctx)?;
        response.validate()
    }
}
