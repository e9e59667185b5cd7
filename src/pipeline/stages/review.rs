use serde::Serialize;

use super::http::AiServiceHttp;
use super::StageError;
use crate::pipeline::types::CallContext;

/// Reviewer decision forwarded to the AI service's review tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Approve => "/review/approve",
            Self::Reject => "/review/reject",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Callback telling the collaborator a human has reviewed its output.
pub trait ReviewNotifier: Send + Sync {
    fn notify(
        &self,
        decision: ReviewDecision,
        review_id: &str,
        notes: Option<&str>,
        ctx: &CallContext,
    ) -> Result<(), StageError>;
}

#[derive(Serialize)]
struct ReviewActionRequest<'a> {
    review_id: &'a str,
    notes: Option<&'a str>,
}

#[derive(Clone)]
pub struct ReviewClient {
    http: AiServiceHttp,
}

impl ReviewClient {
    pub fn new(http: AiServiceHttp) -> Self {
        Self { http }
    }
}

impl ReviewNotifier for ReviewClient {
    fn notify(
        &self,
        decision: ReviewDecision,
        review_id: &str,
        notes: Option<&str>,
        ctx: &CallContext,
    ) -> Result<(), StageError> {
        let body = ReviewActionRequest { review_id, notes };
        self.http.post_unit(decision.path(), &body, ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn notify(
        uri: String,
        decision: ReviewDecision,
        notes: Option<&'static str>,
    ) -> Result<(), StageError> {
        tokio::task::spawn_blocking(move || {
            let client = ReviewClient::new(AiServiceHttp::new(&uri).unwrap());
            let ctx = CallContext::new(Uuid::new_v4(), Duration::from_secs(2));
            client.notify(decision, "rev-42", notes, &ctx)
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn approve_posts_review_id_and_notes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/review/approve"))
            .and(body_json(serde_json::json!({"review_id": "rev-42", "notes": "ok"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "review_id": "rev-42", "status": "APPROVED", "notes": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        notify(server.uri(), ReviewDecision::Approve, Some("ok"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reject_sends_null_notes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/review/reject"))
            .and(body_json(serde_json::json!({"review_id": "rev-42", "notes": null})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        notify(server.uri(), ReviewDecision::Reject, None).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_review_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/review/approve"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = notify(server.uri(), ReviewDecision::Approve, None)
            .await
            .unwrap_err();
        assert_eq!(err, StageError::Status { status: 404 });
    }
}
