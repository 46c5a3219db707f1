//! Bounded repair loop driving one itinerary request to convergence.
//!
//! The loop is a small state machine: every validation pass yields a
//! [`GenerationState`] via [`next_state`], and each non-terminal state maps
//! to exactly one action (truncate, continue or repair).

use super::pipeline::PipelineConfig;
use super::steps::{GenerationStep, PromptPurpose};
use super::trace::GenerationTrace;
use crate::error::Result;
use crate::generators::TextGenerator;
use crate::itinerary::markdown;
use crate::itinerary::merge::{merge_continuation, merge_repair, truncate_to_target, Merged};
use crate::itinerary::normalizer::ContentNormalizer;
use crate::itinerary::validator::validate;
use crate::services::prompts::{
    build_continuation_prompt, build_itinerary_prompt, build_repair_prompt,
};
use crate::services::retry::{generate_with_retry, RetryPolicy};
use crate::types::outcome::GenerationOutcome;
use crate::types::report::ValidationReport;
use crate::types::request::ItineraryRequest;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Trips longer than this get a "split the request" suggestion on shortfall
const SPLIT_SUGGESTION_DAYS: u32 = 10;

/// Where a generation run stands after a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GenerationState {
    Initial,
    NeedsMoreDays { missing: Vec<u32> },
    NeedsFewerDays { excess: u32 },
    NeedsRepair { days: Vec<u32> },
    Converged,
    GaveUp { reason: String },
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Converged | GenerationState::GaveUp { .. })
    }
}

/// Decide what to do next from a validation report
///
/// `attempts` counts generator-backed repair calls already made. Truncation
/// never costs an attempt, so `NeedsFewerDays` is returned even when the
/// budget is spent.
pub fn next_state(report: &ValidationReport, attempts: usize, max_attempts: usize) -> GenerationState {
    let actual = report.actual_days;
    let target = report.target_days;

    if actual > target {
        return GenerationState::NeedsFewerDays {
            excess: actual - target,
        };
    }

    let wanted = if attempts > 0 && actual >= target {
        GenerationState::Converged
    } else if actual < target {
        if report.shortfall() * 4 >= target || !report.is_valid {
            GenerationState::NeedsMoreDays {
                missing: missing_days(report),
            }
        } else {
            GenerationState::Converged
        }
    } else if !report.is_valid {
        let mut days = report.problem_days();
        if days.is_empty() {
            days = (1..=target).collect();
        }
        GenerationState::NeedsRepair { days }
    } else {
        GenerationState::Converged
    };

    if !wanted.is_terminal() && attempts >= max_attempts {
        return GenerationState::GaveUp {
            reason: format!(
                "no convergence after {} attempts ({} of {} days)",
                attempts, actual, target
            ),
        };
    }

    wanted
}

fn missing_days(report: &ValidationReport) -> Vec<u32> {
    let present: Vec<u32> = report
        .day_details
        .iter()
        .filter(|day| day.has_content)
        .map(|day| day.day_num)
        .collect();
    (1..=report.target_days)
        .filter(|day| !present.contains(day))
        .collect()
}

/// Runs the generate, normalize, validate and repair loop for one request
pub struct ContinuationOrchestrator<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
    normalizer: &'a ContentNormalizer,
    config: &'a PipelineConfig,
}

impl<'a, G: TextGenerator + ?Sized> ContinuationOrchestrator<'a, G> {
    pub fn new(generator: &'a G, normalizer: &'a ContentNormalizer, config: &'a PipelineConfig) -> Self {
        Self {
            generator,
            normalizer,
            config,
        }
    }

    /// Generate an itinerary for `request`
    ///
    /// Only a failure of the initial generation is an error. Once a draft
    /// exists, failed adjustment calls end the loop and the draft is returned
    /// with a warning.
    pub async fn run(&self, request: &ItineraryRequest) -> Result<GenerationOutcome> {
        let started = Instant::now();
        let target = request.target_days();
        let mut trace = GenerationTrace::new();
        let mut warnings = Vec::new();

        info!(
            target: "itinerary::orchestrator",
            country = request.country(),
            target_days = target,
            generator = self.generator.name(),
            "starting itinerary generation"
        );

        let prompt = build_itinerary_prompt(request);
        let raw = self
            .call(&prompt, PromptPurpose::Initial, self.config.initial_retry, &mut trace)
            .await?;
        let mut content = self.normalize(&raw, &mut trace, &mut warnings);

        let mut attempts = 0usize;
        let mut trimmed_excess = 0u32;

        let (state, report) = loop {
            let report = validate(&content, target);
            trace.add_step(GenerationStep::Validated {
                actual_days: report.actual_days,
                target_days: report.target_days,
                is_valid: report.is_valid,
                error_count: report.errors.len(),
            });

            let state = next_state(&report, attempts, self.config.max_attempts);
            debug!(target: "itinerary::orchestrator", ?state, attempts, "validation pass");

            match state {
                GenerationState::NeedsFewerDays { excess } => {
                    content = truncate_to_target(&content, target);
                    trimmed_excess = trimmed_excess.max(excess);
                    trace.add_step(GenerationStep::Truncated {
                        from_days: report.actual_days,
                        to_days: markdown::max_day_number(&content),
                    });
                }
                GenerationState::NeedsMoreDays { missing } => {
                    attempts += 1;
                    trace.add_step(GenerationStep::ContinuationRequested {
                        attempt: attempts,
                        missing_days: missing.clone(),
                    });
                    let prompt =
                        build_continuation_prompt(request, &content, report.actual_days, &missing);
                    match self
                        .call(&prompt, PromptPurpose::Continuation, self.config.adjustment_retry, &mut trace)
                        .await
                    {
                        Ok(raw) => {
                            let incoming = self.normalize(&raw, &mut trace, &mut warnings);
                            content = self.record_merge(merge_continuation(&content, &incoming), &mut trace);
                        }
                        Err(err) => break self.abandon(err, report, &mut trace),
                    }
                }
                GenerationState::NeedsRepair { days } => {
                    attempts += 1;
                    trace.add_step(GenerationStep::RepairRequested {
                        attempt: attempts,
                        days: days.clone(),
                    });
                    let prompt = build_repair_prompt(request, &content, &report, &days);
                    match self
                        .call(&prompt, PromptPurpose::Repair, self.config.adjustment_retry, &mut trace)
                        .await
                    {
                        Ok(raw) => {
                            let incoming = self.normalize(&raw, &mut trace, &mut warnings);
                            content = self.record_merge(merge_repair(&content, &incoming, &days), &mut trace);
                        }
                        Err(err) => break self.abandon(err, report, &mut trace),
                    }
                }
                // next_state never yields Initial
                GenerationState::Initial | GenerationState::Converged => {
                    trace.add_step(GenerationStep::Converged {
                        actual_days: report.actual_days,
                    });
                    break (GenerationState::Converged, report);
                }
                GenerationState::GaveUp { reason } => {
                    trace.add_step(GenerationStep::GaveUp {
                        reason: reason.clone(),
                    });
                    break (GenerationState::GaveUp { reason }, report);
                }
            }
        };

        final_warnings(&report, &state, trimmed_excess, &mut warnings);

        info!(
            target: "itinerary::orchestrator",
            actual_days = report.actual_days,
            target_days = target,
            attempts,
            converged = matches!(state, GenerationState::Converged),
            "itinerary generation finished"
        );

        Ok(GenerationOutcome {
            content,
            request: request.clone(),
            report,
            state,
            warnings,
            steps: trace.into_steps(),
            attempts,
            duration: started.elapsed(),
        })
    }

    async fn call(
        &self,
        prompt: &str,
        purpose: PromptPurpose,
        policy: RetryPolicy,
        trace: &mut GenerationTrace,
    ) -> Result<String> {
        trace.add_step(GenerationStep::Prompted {
            purpose,
            prompt_chars: prompt.chars().count(),
        });
        generate_with_retry(self.generator, prompt, policy).await
    }

    fn normalize(&self, raw: &str, trace: &mut GenerationTrace, warnings: &mut Vec<String>) -> String {
        let normalized = self.normalizer.normalize(raw);
        trace.add_step(GenerationStep::Normalized {
            chars: normalized.content.chars().count(),
            warning: normalized.warning.clone(),
        });
        if normalized.warning.is_some() {
            push_unique(
                warnings,
                format!(
                    "The generated text exceeded {} characters and was truncated at a day boundary.",
                    self.normalizer.max_chars()
                ),
            );
        }
        normalized.content
    }

    fn record_merge(&self, merged: Merged, trace: &mut GenerationTrace) -> String {
        trace.add_step(GenerationStep::Merged {
            applied_days: merged.applied_days,
            skipped_days: merged.skipped_days,
        });
        merged.content
    }

    fn abandon(
        &self,
        err: crate::error::ItineraryError,
        report: ValidationReport,
        trace: &mut GenerationTrace,
    ) -> (GenerationState, ValidationReport) {
        warn!(
            target: "itinerary::orchestrator",
            error = %err,
            "adjustment call failed, keeping current draft"
        );
        let reason = format!("generator failed during repair: {}", err);
        trace.add_step(GenerationStep::GaveUp {
            reason: reason.clone(),
        });
        (GenerationState::GaveUp { reason }, report)
    }
}

fn push_unique(warnings: &mut Vec<String>, warning: String) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}

fn final_warnings(
    report: &ValidationReport,
    state: &GenerationState,
    trimmed_excess: u32,
    warnings: &mut Vec<String>,
) {
    if report.actual_days < report.target_days {
        let mut warning = format!(
            "The itinerary has {} of the requested {} days.",
            report.actual_days, report.target_days
        );
        if report.target_days > SPLIT_SUGGESTION_DAYS {
            warning.push_str(
                " For long trips, try splitting the request into two queries (for example days 1-10 and the rest).",
            );
        }
        push_unique(warnings, warning);
    }

    if trimmed_excess > 0 {
        push_unique(
            warnings,
            format!(
                "The generator produced {} extra day(s); the itinerary was trimmed to {} days.",
                trimmed_excess, report.target_days
            ),
        );
    }

    let incomplete = report.incomplete_days();
    if !incomplete.is_empty() {
        let days = incomplete
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        push_unique(
            warnings,
            format!("Some days are missing sections or detail: day {}.", days),
        );
    }

    if let GenerationState::GaveUp { reason } = state {
        push_unique(
            warnings,
            format!("Returning the best draft obtained; {}.", reason),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::DayDiagnostic;

    fn report(actual: u32, target: u32, is_valid: bool) -> ValidationReport {
        ValidationReport {
            actual_days: actual,
            target_days: target,
            header_valid: is_valid,
            subheaders_valid: true,
            content_valid: is_valid,
            is_valid,
            errors: Vec::new(),
            day_details: (1..=actual.min(target))
                .map(|day_num| {
                    let mut day = DayDiagnostic::new(day_num);
                    day.has_content = true;
                    day
                })
                .collect(),
        }
    }

    #[test]
    fn excess_days_truncate_even_without_budget() {
        assert_eq!(
            next_state(&report(9, 6, false), 3, 3),
            GenerationState::NeedsFewerDays { excess: 3 }
        );
    }

    #[test]
    fn large_shortfall_forces_continuation() {
        assert_eq!(
            next_state(&report(2, 3, true), 0, 3),
            GenerationState::NeedsMoreDays { missing: vec![3] }
        );
    }

    #[test]
    fn small_valid_shortfall_converges() {
        assert_eq!(next_state(&report(19, 20, true), 0, 3), GenerationState::Converged);
        assert_eq!(
            next_state(&report(18, 20, false), 0, 3),
            GenerationState::NeedsMoreDays {
                missing: vec![19, 20]
            }
        );
    }

    #[test]
    fn day_count_wins_after_an_attempt() {
        assert_eq!(next_state(&report(5, 5, false), 1, 3), GenerationState::Converged);
    }

    #[test]
    fn invalid_exact_count_requests_repair_of_problem_days() {
        let mut report = report(3, 3, false);
        report.day_details[1].has_content = false;
        assert_eq!(
            next_state(&report, 0, 3),
            GenerationState::NeedsRepair { days: vec![2] }
        );
    }

    #[test]
    fn wholesale_failure_repairs_every_day() {
        assert_eq!(
            next_state(&report(2, 2, false), 0, 3),
            GenerationState::NeedsRepair { days: vec![1, 2] }
        );
    }

    #[test]
    fn exhausted_budget_gives_up() {
        let state = next_state(&report(1, 5, false), 3, 3);
        assert!(matches!(state, GenerationState::GaveUp { .. }));
    }
}
