//! Resuming a user-supplied partial draft.
//!
//! A reduced version of the repair loop: one call at most, and either pure
//! continuation (the draft is short) or a structural patch (the draft has
//! enough days but is missing sections), never both.

use super::pipeline::PipelineConfig;
use crate::error::Result;
use crate::generators::TextGenerator;
use crate::itinerary::analysis::{analyze, parse_continuation_target};
use crate::itinerary::markdown;
use crate::itinerary::merge::{merge_continuation, merge_patch};
use crate::itinerary::normalizer::ContentNormalizer;
use crate::services::prompts::{build_patch_prompt, build_resume_prompt};
use crate::services::retry::{generate_with_retry, RetryPolicy};
use crate::types::outcome::{ContinuationMode, ContinuationOutcome};
use tracing::{info, warn};

pub(crate) async fn continue_partial<G>(
    generator: &G,
    normalizer: &ContentNormalizer,
    config: &PipelineConfig,
    draft: &str,
    country: &str,
    days_input: Option<&str>,
) -> Result<ContinuationOutcome>
where
    G: TextGenerator + ?Sized,
{
    let analysis = analyze(draft);
    let current_days = analysis.current_days;
    let target_days = parse_continuation_target(days_input, current_days);

    info!(
        target: "itinerary::orchestrator",
        country,
        current_days,
        target_days,
        score = analysis.completeness_score,
        "continuing partial itinerary"
    );

    let outcome = |content: String, mode: ContinuationMode, note: Option<String>| ContinuationOutcome {
        content,
        original_days: current_days,
        target_days,
        mode,
        analysis: analysis.clone(),
        note,
    };

    if current_days >= target_days {
        if analysis.is_structurally_complete() {
            return Ok(outcome(
                draft.to_string(),
                ContinuationMode::AlreadyComplete,
                Some(format!("The itinerary already has {} complete days.", current_days)),
            ));
        }

        let prompt = build_patch_prompt(country, draft, &analysis);
        return match generate_with_retry(generator, &prompt, RetryPolicy::new(1)).await {
            Ok(raw) => {
                let patch = normalizer.normalize(&raw).content;
                let merged = merge_patch(draft, &patch, Some(current_days));
                if merged.is_noop() {
                    Ok(outcome(
                        draft.to_string(),
                        ContinuationMode::PatchFailed,
                        Some("The generated patch could not be applied; the draft is unchanged.".to_string()),
                    ))
                } else {
                    Ok(outcome(merged.content, ContinuationMode::Patched, None))
                }
            }
            Err(err) => {
                warn!(target: "itinerary::orchestrator", error = %err, "patch generation failed");
                Ok(outcome(
                    draft.to_string(),
                    ContinuationMode::PatchFailed,
                    Some(format!("Missing sections could not be generated: {}", err)),
                ))
            }
        };
    }

    let prompt = build_resume_prompt(country, draft, target_days, &analysis);
    let raw = generate_with_retry(generator, &prompt, config.adjustment_retry).await?;
    let incoming = normalizer.normalize(&raw).content;

    // a draft without any day header is replaced, not prefixed
    let base = if current_days == 0 { "" } else { draft };
    let merged = merge_continuation(base, &incoming);

    if merged.is_noop() {
        warn!(target: "itinerary::orchestrator", "resume reply contained no new days");
        return Ok(outcome(
            draft.to_string(),
            ContinuationMode::NoNewDays,
            Some("The generator returned no new days; the draft is unchanged.".to_string()),
        ));
    }

    let note = (markdown::max_day_number(&merged.content) < target_days).then(|| {
        format!(
            "Added days {}; the itinerary still falls short of {} days.",
            join_days(&merged.applied_days),
            target_days
        )
    });
    Ok(outcome(merged.content, ContinuationMode::Continued, note))
}

fn join_days(days: &[u32]) -> String {
    days.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
