use serde::{Deserialize, Serialize};

use super::http::AiServiceHttp;
use super::retrieval::Snippet;
use super::StageError;
use crate::models::SourceItem;
use crate::pipeline::types::{CallContext, SafeText};

/// Response generation collaborator.
pub trait ReplyGenerator: Send + Sync {
    fn generate(
        &self,
        request: &GenerationRequest<'_>,
        ctx: &CallContext,
    ) -> Result<GenerationResponse, StageError>;
}

/// Everything the generator sees. The text can only come from `SafeText`.
#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    text: &'a str,
    category: &'a str,
    urgency: &'a str,
    relevant_snippets: &'a [Snippet],
}

impl<'a> GenerationRequest<'a> {
    pub fn new(
        text: &'a SafeText,
        category: &'a str,
        urgency: &'a str,
        relevant_snippets: &'a [Snippet],
    ) -> Self {
        Self {
            text: text.as_str(),
            category,
            urgency,
            relevant_snippets,
        }
    }

    pub fn category(&self) -> &str {
        self.category
    }

    pub fn urgency(&self) -> &str {
        self.urgency
    }

    pub fn snippet_count(&self) -> usize {
        self.relevant_snippets.len()
    }

    pub fn text(&self) -> &str {
        self.text
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationResponse {
    pub action_plan: Vec<String>,
    pub customer_reply_draft: String,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceItem>,
}

impl GenerationResponse {
    /// A reply with nothing to send the customer is not a usable draft.
    pub fn validate(self) -> Result<Self, StageError> {
        if self.customer_reply_draft.trim().is_empty() {
            return Err(StageError::MalformedResponse("blank customer_reply_draft".into()));
        }
        Ok(self)
    }
}

/// HTTP client for `POST /generate`.
#[derive(Clone)]
pub struct GenerationClient {
    http: AiServiceHttp,
}

impl GenerationClient {
    pub fn new(http: AiServiceHttp) -> Self {
        Self { http }
    }
}

impl ReplyGenerator for GenerationClient {
    fn generate(
        &self,
        request: &GenerationRequest<'_>,
        ctx: &CallContext,
    ) -> Result<GenerationResponse, StageError> {
        let response: GenerationResponse = self.http.post_json("/generate", request, ctx)?;
        response.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn call(uri: String) -> Result<GenerationResponse, StageError> {
        tokio::task::spawn_blocking(move || {
            let client = GenerationClient::new(AiServiceHttp::new(&uri).unwrap());
            let text = SafeText::from_masked("Kartım [MASKED_CARD] kopyalandı".into()).unwrap();
            let snippets = vec![Snippet::Text("Şüpheli işlemde kart bloke edilir.".into())];
            let request = GenerationRequest::new(&text, "FRAUD_UNAUTHORIZED_TX", "HIGH", &snippets);
            client.generate(&request, &CallContext::new(Uuid::new_v4(), Duration::from_secs(2)))
        })
        .await
        .unwrap()
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let parsed: GenerationResponse = serde_json::from_str(
            r#"{"action_plan":["İşlem inceleniyor"],"customer_reply_draft":"Şikayetiniz alındı."}"#,
        )
        .unwrap();
        assert!(parsed.risk_flags.is_empty());
        assert!(parsed.sources.is_empty());
    }

    #[test]
    fn blank_reply_is_malformed() {
        let parsed: GenerationResponse =
            serde_json::from_str(r#"{"action_plan":["x"],"customer_reply_draft":" "}"#).unwrap();
        assert!(matches!(
            parsed.validate(),
            Err(StageError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn sends_masked_context_and_decodes_sources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_json(serde_json::json!({
                "text": "Kartım [MASKED_CARD] kopyalandı",
                "category": "FRAUD_UNAUTHORIZED_TX",
                "urgency": "HIGH",
                "relevant_snippets": ["Şüpheli işlemde kart bloke edilir."]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "action_plan": ["Kartı bloke et", "İtiraz süreci başlat"],
                "customer_reply_draft": "Kartınız güvenlik amacıyla bloke edildi.",
                "risk_flags": ["FRAUD"],
                "sources": [{
                    "doc_name": "Kart Politikası",
                    "source": "policy/cards.md",
                    "snippet": "Şüpheli işlemde kart bloke edilir.",
                    "chunk_id": "c-3"
                }],
                "error_code": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = call(server.uri()).await.unwrap();
        assert_eq!(response.action_plan.len(), 2);
        assert_eq!(response.risk_flags, vec!["FRAUD".to_string()]);
        assert_eq!(response.sources[0].chunk_id.as_deref(), Some("c-3"));
    }

    #[tokio::test]
    async fn missing_action_plan_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"customer_reply_draft": "Şikayetiniz alındı."}),
            ))
            .mount(&server)
            .await;

        let err = call(server.uri()).await.unwrap_err();
        assert!(matches!(err, StageError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn service_unavailable_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = call(server.uri()).await.unwrap_err();
        assert_eq!(err, StageError::Status { status: 503 });
    }
}
