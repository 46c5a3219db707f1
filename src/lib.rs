//! tiny-itinerary-rs: normalization, validation and repair of LLM-generated travel itineraries
//!
//! The library turns a structured [`ItineraryRequest`] into a prompt, calls an
//! opaque [`TextGenerator`], cleans the markdown it returns, validates it against
//! a day/subsection contract and re-prompts for missing or broken days until the
//! itinerary converges or the attempt budget runs out.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tiny_itinerary_rs::{ItineraryPipeline, ItineraryRequest, OpenAiGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = OpenAiGenerator::from_env()?;
//!     let pipeline = ItineraryPipeline::new(generator);
//!
//!     let request = ItineraryRequest::builder("Japan", "3-5")
//!         .with_travel_type("culture")
//!         .build()?;
//!
//!     let outcome = pipeline.generate(&request).await?;
//!     println!("{}", outcome.content);
//!     for attraction in outcome.attractions_for_day(1) {
//!         println!("{} ({})", attraction.name, attraction.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod error;
pub mod generators;
pub mod itinerary;
pub mod schemas;
pub(crate) mod services;
pub mod store;
pub mod types;

pub use core::{
    build_continuation_prompt, build_itinerary_prompt, build_patch_prompt, build_repair_prompt,
    build_resume_prompt, next_state, ContinuationOrchestrator, GenerationState, GenerationStep,
    GenerationTrace, ItineraryPipeline, PipelineConfig, PromptPurpose,
};
pub use error::{FieldError, ItineraryError, Result};
pub use generators::{OpenAiGenerator, ScriptedGenerator, TextGenerator};
pub use itinerary::{
    analyze, attractions_for_day, extract_attractions, infer_metadata, merge_continuation,
    merge_patch, merge_repair, truncate_to_target, validate, AttractionExtractor, BoldingLexicon,
    ContentAnalysis, ContentNormalizer, ItineraryMetadata, Normalized, StructureValidator,
};
pub use schemas::{parse_request, ItineraryRequestPayload};
pub use services::retry::{generate_with_retry, RetryPolicy};
pub use types::{
    Attraction, CompletenessDescriptor, ContinuationMode, ContinuationOutcome, DayDiagnostic,
    GenerationOutcome, ItineraryRequest, Subsection, TravelType, ValidationReport,
};

#[cfg(feature = "cli")]
pub mod cli;
