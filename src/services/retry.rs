use std::time::Duration;

use tracing::warn;

use crate::error::{ItineraryError, Result};
use crate::generators::TextGenerator;

/// Bounded retry with linear backoff (`base_delay * attempt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Self::DEFAULT_BASE_DELAY,
        }
    }

    /// Policy for the first full generation
    pub fn initial() -> Self {
        Self::new(3)
    }

    /// Policy for continuation and repair calls
    pub fn adjustment() -> Self {
        Self::new(2)
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delay * attempt as u32
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::initial()
    }
}

/// Call the generator until it returns non-empty text
///
/// Empty responses and retryable errors consume an attempt. Anything else is
/// returned immediately. Exhaustion yields [`ItineraryError::GeneratorUnavailable`].
pub async fn generate_with_retry<G>(
    generator: &G,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String>
where
    G: TextGenerator + ?Sized,
{
    let mut last_error = ItineraryError::EmptyResponse;

    for attempt in 1..=policy.max_attempts {
        match generator.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => last_error = ItineraryError::EmptyResponse,
            Err(err) if err.is_retryable() => last_error = err,
            Err(err) => return Err(err),
        }

        warn!(
            target: "itinerary::generator",
            generator = generator.name(),
            attempt,
            max_attempts = policy.max_attempts,
            error = %last_error,
            "generator call failed"
        );

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    Err(ItineraryError::GeneratorUnavailable {
        attempts: policy.max_attempts,
        last_error: last_error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::ScriptedGenerator;

    fn fast(attempts: usize) -> RetryPolicy {
        RetryPolicy::new(attempts).with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn retries_empty_responses() {
        let generator = ScriptedGenerator::new(["", "   ", "# Day 1 (Rome)"]);
        let text = generate_with_retry(&generator, "plan", fast(3)).await.unwrap();
        assert_eq!(text, "# Day 1 (Rome)");
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let generator = ScriptedGenerator::empty()
            .then_fail(ItineraryError::Timeout("slow".to_string()))
            .then_fail(ItineraryError::Timeout("slow".to_string()));
        let err = generate_with_retry(&generator, "plan", fast(2)).await.unwrap_err();

        match err {
            ItineraryError::GeneratorUnavailable { attempts, last_error } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("slow"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn config_errors_are_not_retried() {
        let generator = ScriptedGenerator::empty()
            .then_fail(ItineraryError::Config("no key".to_string()))
            .then_respond("unused");
        let err = generate_with_retry(&generator, "plan", fast(3)).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(generator.call_count(), 1);
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::initial();
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(RetryPolicy::adjustment().max_attempts, 2);
    }
}
