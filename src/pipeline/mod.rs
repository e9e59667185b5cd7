pub mod fallback;
pub mod orchestrator;
pub mod stages;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{ComplaintPipeline, PipelineError, PipelineStages};
pub use types::{CallContext, RawComplaintText, SafeText, StageTimeouts};
