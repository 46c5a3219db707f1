use super::attraction::Attraction;
use super::report::{CompletenessDescriptor, ValidationReport};
use super::request::ItineraryRequest;
use crate::core::orchestrator::GenerationState;
use crate::core::steps::GenerationStep;
use crate::itinerary::analysis::ContentAnalysis;
use crate::itinerary::extractor::attractions_for_day;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a full generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Best itinerary text obtained
    pub content: String,
    pub request: ItineraryRequest,
    /// Validation of `content` against the target day count
    pub report: ValidationReport,
    /// Terminal state of the repair loop (Converged or GaveUp)
    pub state: GenerationState,
    /// Human-readable notes attached to the result
    pub warnings: Vec<String>,
    pub steps: Vec<GenerationStep>,
    /// Generator-backed repair attempts used
    pub attempts: usize,
    pub duration: Duration,
}

impl GenerationOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self.state, GenerationState::Converged)
    }

    pub fn completeness(&self) -> CompletenessDescriptor {
        self.report.completeness()
    }

    /// Attractions of one day of the final text
    pub fn attractions_for_day(&self, day_num: u32) -> Vec<Attraction> {
        attractions_for_day(&self.content, day_num)
    }

    /// Generate a human-readable replay of the run
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Itinerary Generation Trace ===".to_string());
        lines.push(format!(
            "Request: {} days in {} (range {})",
            self.request.target_days(),
            self.request.country(),
            self.request.day_range()
        ));
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Attempts: {}", self.attempts));
        lines.push(format!(
            "Days: {}/{}{}",
            self.report.actual_days,
            self.report.target_days,
            if self.report.is_valid { " (valid)" } else { "" }
        ));

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());
        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push("--- Warnings ---".to_string());
            for warning in &self.warnings {
                lines.push(format!("- {}", warning));
            }
        }

        lines.push(String::new());
        lines.push("--- Final Itinerary ---".to_string());
        lines.push(self.content.clone());

        lines.join("\n")
    }
}

/// What the partial-draft path did with a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationMode {
    /// Draft already had enough days and every structure; returned unchanged
    AlreadyComplete,
    /// Missing days were generated and appended
    Continued,
    /// The generator replied without any new day; the draft is returned as-is
    NoNewDays,
    /// Missing sections were generated and folded into existing days
    Patched,
    /// Patch generation failed; the draft is returned as-is
    PatchFailed,
}

/// Result of continuing a user-supplied partial draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationOutcome {
    pub content: String,
    pub original_days: u32,
    pub target_days: u32,
    pub mode: ContinuationMode,
    /// Analysis of the draft as it was received
    pub analysis: ContentAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ContinuationOutcome {
    pub fn changed(&self) -> bool {
        matches!(
            self.mode,
            ContinuationMode::Continued | ContinuationMode::Patched
        )
    }
}
