//! Text-level building blocks: parsing, cleaning, validating and merging
//! itinerary markdown. Nothing in here performs I/O.

pub mod analysis;
pub mod bolding;
pub mod extractor;
pub mod markdown;
pub mod merge;
pub mod normalizer;
pub mod validator;

pub use analysis::{
    analyze, infer_metadata, parse_continuation_target, style_features, ContentAnalysis,
    ItineraryMetadata, Region, StyleFeatures,
};
pub use bolding::BoldingLexicon;
pub use extractor::{attractions_for_day, extract_attractions, AttractionExtractor};
pub use merge::{merge_continuation, merge_patch, merge_repair, truncate_to_target, Merged};
pub use normalizer::{ContentNormalizer, Normalized, MAX_CONTENT_CHARS};
pub use validator::{day_tolerance, validate, StructureValidator};
