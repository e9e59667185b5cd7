//! Blocking JSON transport shared by the collaborator clients.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StageError;
use crate::pipeline::types::CallContext;

/// Header carrying the pipeline correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Immutable HTTP client bound to the AI service base URL.
///
/// Cheap to clone; clones share one connection pool. Timeouts are per call
/// (`CallContext`), not per client.
#[derive(Clone)]
pub struct AiServiceHttp {
    base_url: String,
    client: Client,
}

impl AiServiceHttp {
    pub fn new(base_url: &str) -> Result<Self, StageError> {
        let client = Client::builder()
            .build()
            .map_err(|e| StageError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` as JSON to `{base_url}{path}` and decode the JSON reply.
    pub fn post_json<Req, Resp>(
        &self,
        path: &str,
        body: &Req,
        ctx: &CallContext,
    ) -> Result<Resp, StageError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let bytes = self.post(path, body, ctx)?;
        decode_json(&bytes)
    }

    /// POST and discard the reply body.
    pub fn post_unit<Req>(&self, path: &str, body: &Req, ctx: &CallContext) -> Result<(), StageError>
    where
        Req: Serialize + ?Sized,
    {
        self.post(path, body, ctx).map(|_| ())
    }

    fn post<Req>(&self, path: &str, body: &Req, ctx: &CallContext) -> Result<Vec<u8>, StageError>
    where
        Req: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header(REQUEST_ID_HEADER, ctx.request_id.to_string())
            .timeout(ctx.timeout)
            .json(body)
            .send()
            .map_err(|e| self.map_transport_error(e, ctx))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StageError::Status {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| self.map_transport_error(e, ctx))
    }

    fn map_transport_error(&self, e: reqwest::Error, ctx: &CallContext) -> StageError {
        if e.is_timeout() {
            StageError::Timeout {
                after_ms: ctx.timeout_ms(),
            }
        } else if e.is_connect() {
            StageError::Connection(self.base_url.clone())
        } else {
            StageError::Http(e.without_url().to_string())
        }
    }
}

/// Decode a JSON body. The error keeps only the position and category,
/// since serde messages can quote offending values.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StageError> {
    serde_json::from_slice(bytes).map_err(|e| {
        StageError::MalformedResponse(format!(
            "{:?} error at line {} column {}",
            e.classify(),
            e.line(),
            e.column()
        ))
    })
}
