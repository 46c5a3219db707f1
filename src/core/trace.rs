use super::steps::GenerationStep;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Ordered record of what happened during one generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationTrace {
    steps: Vec<GenerationStep>,
}

impl GenerationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the trace
    pub fn add_step(&mut self, step: GenerationStep) {
        let description = step.describe();
        info!(target: "itinerary::steps", "{}", description);
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[GenerationStep] {
        &self.steps
    }

    pub fn last_step(&self) -> Option<&GenerationStep> {
        self.steps.last()
    }

    /// Number of generator calls that were prompted for the given purpose
    pub fn prompts_for(&self, purpose: super::steps::PromptPurpose) -> usize {
        self.steps
            .iter()
            .filter(|step| {
                matches!(step, GenerationStep::Prompted { purpose: p, .. } if *p == purpose)
            })
            .count()
    }

    pub fn into_steps(self) -> Vec<GenerationStep> {
        self.steps
    }
}
