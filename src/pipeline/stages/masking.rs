use serde::{Deserialize, Serialize};

use super::http::AiServiceHttp;
use super::StageError;
use crate::pipeline::types::{CallContext, RawComplaintText};

/// PII masking collaborator. The only stage that ever sees raw text.
pub trait PiiMasker: Send + Sync {
    fn mask(
        &self,
        text: &RawComplaintText,
        ctx: &CallContext,
    ) -> Result<MaskingResponse, StageError>;
}

#[derive(Serialize)]
struct MaskingRequest<'a> {
    text: &'a str,
}

/// Reply of the masking collaborator.
///
/// Any `original_text` echoed by the collaborator is not a field here and
/// is dropped during decoding. An absent or null `masked_text` decodes as
/// empty; deciding that this is a failure is the orchestrator's job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MaskingResponse {
    #[serde(default)]
    masked_text: Option<String>,
    #[serde(default)]
    masked_entities: Option<Vec<String>>,
}

impl MaskingResponse {
    pub fn new(masked_text: impl Into<String>, masked_entities: Vec<String>) -> Self {
        Self {
            masked_text: Some(masked_text.into()),
            masked_entities: Some(masked_entities),
        }
    }

    pub fn masked_entities(&self) -> &[String] {
        self.masked_entities.as_deref().unwrap_or_default()
    }

    pub fn into_masked_text(self) -> String {
        self.masked_text.unwrap_or_default()
    }
}

/// HTTP client for `POST /mask`.
#[derive(Clone)]
pub struct PiiGatewayClient {
    http: AiServiceHttp,
}

impl PiiGatewayClient {
    pub fn new(http: AiServiceHttp) -> Self {
        Self { http }
    }
}

impl PiiMasker for PiiGatewayClient {
    fn mask(
        &self,
        text: &RawComplaintText,
        ctx: &CallContext,
    ) -> Result<MaskingResponse, StageError> {
        let body = MaskingRequest {
            text: text.expose(),
        };
        self.http.post_json("/mask", &body, ctx)
    }
}
