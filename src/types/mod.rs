pub mod attraction;
pub mod outcome;
pub mod report;
pub mod request;

pub use attraction::Attraction;
pub use outcome::{ContinuationMode, ContinuationOutcome, GenerationOutcome};
pub use report::{CompletenessDescriptor, DayDiagnostic, DayIssues, Subsection, ValidationReport};
pub use request::{DayAdjustment, DayRange, ItineraryRequest, ItineraryRequestBuilder, TravelType};
