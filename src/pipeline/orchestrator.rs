//! Complaint analysis pipeline.
//!
//! Coordinates: mask → (gate) → triage → retrieve → generate → assemble → persist.
//!
//! Masking is fail-closed: if it errors or yields blank text, a fixed
//! MASKING_FAILED record is persisted and no later stage is called. Every
//! later stage degrades to a substitute value and a status marker instead
//! of failing the run. Only persistence errors reach the caller.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::fallback::{
    DEFAULT_TRIAGE_URGENCY, FAIL_CLOSED_REPLY, FAIL_CLOSED_URGENCY, GENERATION_FALLBACK_ACTION,
    GENERATION_FALLBACK_REPLY, MANUAL_REVIEW_CATEGORY, MASKING_EMPTY_ACTION, MASKING_SENTINEL,
    MASKING_UNAVAILABLE_ACTION,
};
use super::stages::{
    AiServiceHttp, EvidenceRetriever, GenerationClient, GenerationRequest, GenerationResponse,
    PiiGatewayClient, PiiMasker, ReplyGenerator, RetrievalClient, Snippet, StageError,
    TriageClassifier, TriageClient, TriageResponse,
};
use super::types::{CallContext, RawComplaintText, SafeText, StageTimeouts};
use crate::db::{ComplaintStore, DatabaseError};
use crate::models::{ComplaintRecord, ComplaintStatus, LlmStatus, NewComplaint, RagStatus};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to persist complaint analysis: {0}")]
    Persistence(#[from] DatabaseError),
}

/// The four collaborators, injected as immutable shared clients.
#[derive(Clone)]
pub struct PipelineStages {
    pub masker: Arc<dyn PiiMasker>,
    pub triage: Arc<dyn TriageClassifier>,
    pub retriever: Arc<dyn EvidenceRetriever>,
    pub generator: Arc<dyn ReplyGenerator>,
}

impl PipelineStages {
    /// HTTP clients sharing one connection pool.
    pub fn http(http: &AiServiceHttp) -> Self {
        Self {
            masker: Arc::new(PiiGatewayClient::new(http.clone())),
            triage: Arc::new(TriageClient::new(http.clone())),
            retriever: Arc::new(RetrievalClient::new(http.clone())),
            generator: Arc::new(GenerationClient::new(http.clone())),
        }
    }
}

/// Why the masking gate closed.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskingFailure {
    Unavailable(StageError),
    EmptyResult,
}

impl MaskingFailure {
    fn action(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => MASKING_UNAVAILABLE_ACTION,
            Self::EmptyResult => MASKING_EMPTY_ACTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaskingOutcome {
    Masked(SafeText),
    FailClosed(MaskingFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriageOutcome {
    Classified(TriageResponse),
    Defaulted,
}

impl TriageOutcome {
    pub fn category(&self) -> &str {
        match self {
            Self::Classified(t) => &t.category,
            Self::Defaulted => MANUAL_REVIEW_CATEGORY,
        }
    }

    pub fn urgency(&self) -> &str {
        match self {
            Self::Classified(t) => &t.urgency,
            Self::Defaulted => DEFAULT_TRIAGE_URGENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    Retrieved(Vec<Snippet>),
    Unavailable,
}

impl RetrievalOutcome {
    pub fn snippets(&self) -> &[Snippet] {
        match self {
            Self::Retrieved(snippets) => snippets,
            Self::Unavailable => &[],
        }
    }

    pub fn status(&self) -> RagStatus {
        match self {
            Self::Retrieved(_) => RagStatus::Ok,
            Self::Unavailable => RagStatus::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(GenerationResponse),
    TemplateFallback,
}

impl GenerationOutcome {
    pub fn status(&self) -> LlmStatus {
        match self {
            Self::Generated(_) => LlmStatus::Ok,
            Self::TemplateFallback => LlmStatus::TemplateFallback,
        }
    }
}

/// Record persisted when masking could not be guaranteed.
///
/// Built from constants only; nothing here depends on the complaint.
pub fn fail_closed_record(failure: &MaskingFailure) -> NewComplaint {
    NewComplaint {
        masked_text: MASKING_SENTINEL.to_string(),
        category: Some(MANUAL_REVIEW_CATEGORY.to_string()),
        urgency: Some(FAIL_CLOSED_URGENCY.to_string()),
        category_confidence: None,
        urgency_confidence: None,
        action_plan: vec![failure.action().to_string()],
        customer_reply_draft: FAIL_CLOSED_REPLY.to_string(),
        sources: Vec::new(),
        needs_human_review: true,
        review_id: None,
        rag_status: RagStatus::Unavailable,
        llm_status: LlmStatus::TemplateFallback,
        status: ComplaintStatus::MaskingFailed,
    }
}

/// Build the ANALYZED record from the outputs of stages 2 to 4.
///
/// Pure: the same inputs always give the same record.
pub fn assemble(
    safe_text: &SafeText,
    triage: &TriageOutcome,
    retrieval: &RetrievalOutcome,
    generation: &GenerationOutcome,
) -> NewComplaint {
    let (category_confidence, urgency_confidence, triage_review, review_id) = match triage {
        TriageOutcome::Classified(t) => (
            t.category_confidence,
            t.urgency_confidence,
            t.needs_human_review,
            t.review_id.clone(),
        ),
        TriageOutcome::Defaulted => (None, None, true, None),
    };

    let (action_plan, customer_reply_draft, sources) = match generation {
        GenerationOutcome::Generated(g) => (
            g.action_plan.clone(),
            g.customer_reply_draft.clone(),
            g.sources.clone(),
        ),
        GenerationOutcome::TemplateFallback => (
            vec![GENERATION_FALLBACK_ACTION.to_string()],
            GENERATION_FALLBACK_REPLY.to_string(),
            Vec::new(),
        ),
    };

    NewComplaint {
        masked_text: safe_text.as_str().to_string(),
        category: Some(triage.category().to_string()),
        urgency: Some(triage.urgency().to_string()),
        category_confidence,
        urgency_confidence,
        action_plan,
        customer_reply_draft,
        sources,
        needs_human_review: triage_review
            || matches!(generation, GenerationOutcome::TemplateFallback),
        review_id,
        rag_status: retrieval.status(),
        llm_status: generation.status(),
        status: ComplaintStatus::Analyzed,
    }
}

/// Runs one complaint through the four stages and persists the result.
///
/// Holds no per-run state: one instance serves concurrent runs.
pub struct ComplaintPipeline {
    stages: PipelineStages,
    store: Arc<dyn ComplaintStore>,
    timeouts: StageTimeouts,
}

impl ComplaintPipeline {
    pub fn new(
        stages: PipelineStages,
        store: Arc<dyn ComplaintStore>,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            stages,
            store,
            timeouts,
        }
    }

    /// Analyze a complaint. Each run mints its own correlation id and every
    /// stage call of the run carries it.
    pub fn analyze(&self, raw: RawComplaintText) -> Result<ComplaintRecord, PipelineError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id);
        let _enter = span.enter();
        tracing::info!(input_chars = raw.char_count(), "Complaint analysis started");

        let safe_text = match self.mask(raw, request_id) {
            MaskingOutcome::Masked(text) => text,
            MaskingOutcome::FailClosed(failure) => {
                let record = self.store.insert(&fail_closed_record(&failure))?;
                tracing::warn!(
                    complaint_id = record.id,
                    status = %record.status,
                    "Masking gate closed, downstream stages skipped"
                );
                return Ok(record);
            }
        };

        let triage = self.classify(&safe_text, request_id);
        let retrieval = self.retrieve(&safe_text, request_id);
        let generation = self.generate(&safe_text, &triage, &retrieval, request_id);

        let record = self
            .store
            .insert(&assemble(&safe_text, &triage, &retrieval, &generation))?;

        tracing::info!(
            complaint_id = record.id,
            status = %record.status,
            rag_status = %record.rag_status,
            llm_status = %record.llm_status,
            needs_human_review = record.needs_human_review,
            "Complaint analysis persisted"
        );
        Ok(record)
    }

    /// Stage 1. Takes ownership of the raw text; it is wiped on return.
    fn mask(&self, raw: RawComplaintText, request_id: Uuid) -> MaskingOutcome {
        let ctx = CallContext::new(request_id, self.timeouts.masking);
        match self.stages.masker.mask(&raw, &ctx) {
            Ok(response) => {
                tracing::info!(entities = ?response.masked_entities(), "Masking succeeded");
                match SafeText::from_masked(response.into_masked_text()) {
                    Some(text) => {
                        tracing::debug!(masked_chars = text.char_count(), "Masking gate open");
                        MaskingOutcome::Masked(text)
                    }
                    None => {
                        tracing::error!("Masking returned blank text, failing closed");
                        MaskingOutcome::FailClosed(MaskingFailure::EmptyResult)
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Masking unavailable, failing closed");
                MaskingOutcome::FailClosed(MaskingFailure::Unavailable(e))
            }
        }
    }

    fn classify(&self, text: &SafeText, request_id: Uuid) -> TriageOutcome {
        let ctx = CallContext::new(request_id, self.timeouts.triage);
        match self.stages.triage.classify(text, &ctx) {
            Ok(response) => {
                tracing::info!(
                    category = %response.category,
                    urgency = %response.urgency,
                    needs_human_review = response.needs_human_review,
                    "Triage succeeded"
                );
                TriageOutcome::Classified(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Triage failed, using default classification");
                TriageOutcome::Defaulted
            }
        }
    }

    fn retrieve(&self, text: &SafeText, request_id: Uuid) -> RetrievalOutcome {
        let ctx = CallContext::new(request_id, self.timeouts.retrieval);
        match self.stages.retriever.retrieve(text, &ctx) {
            Ok(response) => {
                tracing::info!(snippets = response.relevant_snippets.len(), "Retrieval succeeded");
                RetrievalOutcome::Retrieved(response.relevant_snippets)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Retrieval unavailable");
                RetrievalOutcome::Unavailable
            }
        }
    }

    fn generate(
        &self,
        text: &SafeText,
        triage: &TriageOutcome,
        retrieval: &RetrievalOutcome,
        request_id: Uuid,
    ) -> GenerationOutcome {
        let ctx = CallContext::new(request_id, self.timeouts.generation);
        let request = GenerationRequest::new(
            text,
            triage.category(),
            triage.urgency(),
            retrieval.snippets(),
        );
        match self.stages.generator.generate(&request, &ctx) {
            Ok(response) => {
                tracing::info!(
                    actions = response.action_plan.len(),
                    sources = response.sources.len(),
                    risk_flags = ?response.risk_flags,
                    "Generation succeeded"
                );
                GenerationOutcome::Generated(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Generation failed, using fallback template");
                GenerationOutcome::TemplateFallback
            }
        }
    }
}
