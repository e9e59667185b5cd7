//! Scripted stage doubles and a failing store for pipeline tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use super::orchestrator::PipelineStages;
use super::stages::{
    EvidenceRetriever, GenerationRequest, GenerationResponse, MaskingResponse, PiiMasker,
    ReplyGenerator, RetrievalResponse, ReviewDecision, ReviewNotifier, StageError,
    TriageClassifier, TriageResponse,
};
use super::types::{CallContext, RawComplaintText, SafeText};
use crate::db::{ComplaintStore, DatabaseError, ReplyEdit};
use crate::models::{ComplaintEdit, ComplaintRecord, NewComplaint};

/// What a double saw on one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedCall {
    pub request_id: Uuid,
    pub timeout: Duration,
    pub text: String,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub snippet_count: Option<usize>,
}

impl ReceivedCall {
    fn new(ctx: &CallContext, text: &str) -> Self {
        Self {
            request_id: ctx.request_id,
            timeout: ctx.timeout,
            text: text.to_string(),
            category: None,
            urgency: None,
            snippet_count: None,
        }
    }
}

/// Returns the same scripted reply on every call and records each call.
pub struct Scripted<T> {
    reply: Result<T, StageError>,
    calls: Mutex<Vec<ReceivedCall>>,
}

impl<T: Clone> Scripted<T> {
    pub fn ok(value: T) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(value),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn err(error: StageError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ReceivedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: ReceivedCall) -> Result<T, StageError> {
        self.calls.lock().unwrap().push(call);
        self.reply.clone()
    }
}

impl PiiMasker for Scripted<MaskingResponse> {
    fn mask(
        &self,
        text: &RawComplaintText,
        ctx: &CallContext,
    ) -> Result<MaskingResponse, StageError> {
        self.record(ReceivedCall::new(ctx, text.expose()))
    }
}

impl TriageClassifier for Scripted<TriageResponse> {
    fn classify(&self, text: &SafeText, ctx: &CallContext) -> Result<TriageResponse, StageError> {
        self.record(ReceivedCall::new(ctx, text.as_str()))
    }
}

impl EvidenceRetriever for Scripted<RetrievalResponse> {
    fn retrieve(&self, text: &SafeText, ctx: &CallContext) -> Result<RetrievalResponse, StageError> {
        self.record(ReceivedCall::new(ctx, text.as_str()))
    }
}

impl ReplyGenerator for Scripted<GenerationResponse> {
    fn generate(
        &self,
        request: &GenerationRequest<'_>,
        ctx: &CallContext,
    ) -> Result<GenerationResponse, StageError> {
        self.record(ReceivedCall {
            category: Some(request.category().to_string()),
            urgency: Some(request.urgency().to_string()),
            snippet_count: Some(request.snippet_count()),
            ..ReceivedCall::new(ctx, request.text())
        })
    }
}

impl ReviewNotifier for Scripted<()> {
    fn notify(
        &self,
        decision: ReviewDecision,
        review_id: &str,
        _notes: Option<&str>,
        ctx: &CallContext,
    ) -> Result<(), StageError> {
        self.record(ReceivedCall {
            category: Some(decision.as_str().to_string()),
            ..ReceivedCall::new(ctx, review_id)
        })
    }
}

/// One double per stage; struct-update syntax swaps in failures.
pub struct StageDoubles {
    pub masker: Arc<Scripted<MaskingResponse>>,
    pub triage: Arc<Scripted<TriageResponse>>,
    pub retriever: Arc<Scripted<RetrievalResponse>>,
    pub generator: Arc<Scripted<GenerationResponse>>,
}

impl StageDoubles {
    /// Every stage succeeds; masking yields `masked`.
    pub fn happy_path(masked: &str) -> Self {
        Self {
            masker: Scripted::ok(MaskingResponse::new(masked, vec!["TCKN".into()])),
            triage: Scripted::ok(TriageResponse {
                category: "FRAUD_UNAUTHORIZED_TX".into(),
                category_confidence: Some(0.93),
                urgency: "HIGH".into(),
                urgency_confidence: Some(0.88),
                needs_human_review: false,
                review_id: None,
            }),
            retriever: Scripted::ok(RetrievalResponse {
                relevant_snippets: Vec::new(),
            }),
            generator: Scripted::ok(GenerationResponse {
                action_plan: vec!["İşlem inceleniyor".into()],
                customer_reply_draft: "Şikayetiniz alındı.".into(),
                risk_flags: Vec::new(),
                sources: Vec::new(),
            }),
        }
    }

    pub fn stages(&self) -> PipelineStages {
        PipelineStages {
            masker: self.masker.clone(),
            triage: self.triage.clone(),
            retriever: self.retriever.clone(),
            generator: self.generator.clone(),
        }
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T, DatabaseError> {
        Err(DatabaseError::ConstraintViolation("disk full".into()))
    }
}

impl ComplaintStore for FailingStore {
    fn insert(&self, _complaint: &NewComplaint) -> Result<ComplaintRecord, DatabaseError> {
        Self::fail()
    }

    fn get(&self, _id: i64) -> Result<Option<ComplaintRecord>, DatabaseError> {
        Self::fail()
    }

    fn list(&self) -> Result<Vec<ComplaintRecord>, DatabaseError> {
        Self::fail()
    }

    fn resolve(&self, _id: i64) -> Result<Option<ComplaintRecord>, DatabaseError> {
        Self::fail()
    }

    fn update_reply_draft(&self, _id: i64, _edit: &ReplyEdit) -> Result<ComplaintRecord, DatabaseError> {
        Self::fail()
    }

    fn edit_history(&self, _id: i64) -> Result<Vec<ComplaintEdit>, DatabaseError> {
        Self::fail()
    }
}
