use serde::{Deserialize, Serialize};

/// Why a prompt was sent to the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptPurpose {
    Initial,
    Continuation,
    Repair,
    Resume,
    Patch,
}

impl PromptPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptPurpose::Initial => "initial",
            PromptPurpose::Continuation => "continuation",
            PromptPurpose::Repair => "repair",
            PromptPurpose::Resume => "resume",
            PromptPurpose::Patch => "patch",
        }
    }
}

/// One entry of a generation trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationStep {
    /// A prompt was sent to the generator
    Prompted {
        purpose: PromptPurpose,
        prompt_chars: usize,
    },
    /// A response was cleaned by the normalizer
    Normalized {
        chars: usize,
        #[serde(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    /// The current text was validated
    Validated {
        actual_days: u32,
        target_days: u32,
        is_valid: bool,
        error_count: usize,
    },
    /// Days beyond the target were cut without a generator call
    Truncated { from_days: u32, to_days: u32 },
    ContinuationRequested { attempt: usize, missing_days: Vec<u32> },
    RepairRequested { attempt: usize, days: Vec<u32> },
    /// Generator output was folded into the current text
    Merged {
        applied_days: Vec<u32>,
        skipped_days: Vec<u32>,
    },
    Converged { actual_days: u32 },
    GaveUp { reason: String },
}

fn day_list(days: &[u32]) -> String {
    if days.is_empty() {
        return "none".to_string();
    }
    days.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GenerationStep {
    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            GenerationStep::Prompted {
                purpose,
                prompt_chars,
            } => format!("📝 Prompt ({}): {} chars", purpose.as_str(), prompt_chars),
            GenerationStep::Normalized { chars, warning } => match warning {
                Some(warning) => format!("🧹 Normalized: {} chars ({})", chars, warning),
                None => format!("🧹 Normalized: {} chars", chars),
            },
            GenerationStep::Validated {
                actual_days,
                target_days,
                is_valid,
                error_count,
            } => {
                if *is_valid {
                    format!("🔎 Validated: {}/{} days, valid", actual_days, target_days)
                } else {
                    format!(
                        "🔎 Validated: {}/{} days, {} problem(s)",
                        actual_days, target_days, error_count
                    )
                }
            }
            GenerationStep::Truncated { from_days, to_days } => {
                format!("✂ Truncated: {} -> {} days", from_days, to_days)
            }
            GenerationStep::ContinuationRequested {
                attempt,
                missing_days,
            } => format!(
                "➕ Continuation #{}: days {}",
                attempt,
                day_list(missing_days)
            ),
            GenerationStep::RepairRequested { attempt, days } => {
                format!("🔧 Repair #{}: days {}", attempt, day_list(days))
            }
            GenerationStep::Merged {
                applied_days,
                skipped_days,
            } => format!(
                "🔗 Merged: applied {}, skipped {}",
                day_list(applied_days),
                day_list(skipped_days)
            ),
            GenerationStep::Converged { actual_days } => {
                format!("✅ Converged with {} days", actual_days)
            }
            GenerationStep::GaveUp { reason } => format!("❌ Gave up: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_serialize_with_a_type_tag() {
        let step = GenerationStep::Truncated {
            from_days: 6,
            to_days: 3,
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["type"], "truncated");
        assert_eq!(step.describe(), "✂ Truncated: 6 -> 3 days");
    }

    #[test]
    fn describes_merges() {
        let step = GenerationStep::Merged {
            applied_days: vec![3, 4],
            skipped_days: vec![],
        };
        assert_eq!(step.describe(), "🔗 Merged: applied 3, 4, skipped none");
    }
}
