use super::continuation;
use super::orchestrator::ContinuationOrchestrator;
use crate::error::{ItineraryError, Result};
use crate::generators::{OpenAiGenerator, TextGenerator};
use crate::itinerary::bolding::BoldingLexicon;
use crate::itinerary::normalizer::{ContentNormalizer, Normalized, MAX_CONTENT_CHARS};
use crate::itinerary::validator::validate;
use crate::services::retry::RetryPolicy;
use crate::types::outcome::{ContinuationOutcome, GenerationOutcome};
use crate::types::report::ValidationReport;
use crate::types::request::ItineraryRequest;
use std::time::Duration;

/// Tunables of the generation loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Generator-backed repair attempts after the initial generation
    pub max_attempts: usize,
    pub initial_retry: RetryPolicy,
    pub adjustment_retry: RetryPolicy,
    pub max_content_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_retry: RetryPolicy::initial(),
            adjustment_retry: RetryPolicy::adjustment(),
            max_content_chars: MAX_CONTENT_CHARS,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ITINERARY_MAX_ATTEMPTS` and `ITINERARY_MAX_CONTENT_CHARS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = env_number("ITINERARY_MAX_ATTEMPTS")? {
            config.max_attempts = value;
        }
        if let Some(value) = env_number("ITINERARY_MAX_CONTENT_CHARS")? {
            config.max_content_chars = value;
        }
        Ok(config)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_retry(mut self, policy: RetryPolicy) -> Self {
        self.initial_retry = policy;
        self
    }

    pub fn with_adjustment_retry(mut self, policy: RetryPolicy) -> Self {
        self.adjustment_retry = policy;
        self
    }

    /// Use the same backoff base for both retry policies
    pub fn with_retry_delay(mut self, base_delay: Duration) -> Self {
        self.initial_retry = self.initial_retry.with_base_delay(base_delay);
        self.adjustment_retry = self.adjustment_retry.with_base_delay(base_delay);
        self
    }

    pub fn with_max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.max_content_chars = max_content_chars;
        self
    }
}

fn env_number(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ItineraryError::Config(format!("{key} must be a positive integer, got '{value}'"))),
        Err(_) => Ok(None),
    }
}

/// Entry point: prompt, generate, normalize, validate and repair itineraries
pub struct ItineraryPipeline<G: TextGenerator> {
    generator: G,
    normalizer: ContentNormalizer,
    config: PipelineConfig,
}

impl<G: TextGenerator> ItineraryPipeline<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            normalizer: ContentNormalizer::new(),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.normalizer = self.normalizer.with_max_chars(config.max_content_chars);
        self.config = config;
        self
    }

    /// Replace the curated attraction lists used for bolding
    pub fn with_lexicon(mut self, lexicon: BoldingLexicon) -> Self {
        self.normalizer = self.normalizer.with_lexicon(lexicon);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a full itinerary, repairing it until it converges or the budget runs out
    pub async fn generate(&self, request: &ItineraryRequest) -> Result<GenerationOutcome> {
        ContinuationOrchestrator::new(&self.generator, &self.normalizer, &self.config)
            .run(request)
            .await
    }

    /// Extend or patch a partial draft
    ///
    /// `days_input` is the day count the user asked for ("5", "3-5"); without
    /// it the draft is extended by two days.
    pub async fn continue_partial(
        &self,
        draft: &str,
        country: &str,
        days_input: Option<&str>,
    ) -> Result<ContinuationOutcome> {
        continuation::continue_partial(
            &self.generator,
            &self.normalizer,
            &self.config,
            draft,
            country,
            days_input,
        )
        .await
    }

    pub fn normalize(&self, raw: &str) -> Normalized {
        self.normalizer.normalize(raw)
    }

    pub fn validate(&self, text: &str, target_days: u32) -> ValidationReport {
        validate(text, target_days)
    }
}

impl ItineraryPipeline<OpenAiGenerator> {
    /// Build a pipeline backed by the OpenAI-compatible generator, configured from the environment
    pub fn from_env() -> Result<Self> {
        let generator = OpenAiGenerator::from_env()?;
        let config = PipelineConfig::from_env()?;
        Ok(Self::new(generator).with_config(config))
    }
}
