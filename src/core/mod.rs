pub(crate) mod continuation;
pub mod orchestrator;
pub mod pipeline;
pub mod steps;
pub mod trace;

pub use crate::services::prompts::{
    build_continuation_prompt, build_itinerary_prompt, build_patch_prompt, build_repair_prompt,
    build_resume_prompt,
};
pub use crate::types::outcome::{ContinuationMode, ContinuationOutcome, GenerationOutcome};
pub use orchestrator::{next_state, ContinuationOrchestrator, GenerationState};
pub use pipeline::{ItineraryPipeline, PipelineConfig};
pub use steps::{GenerationStep, PromptPurpose};
pub use trace::GenerationTrace;
