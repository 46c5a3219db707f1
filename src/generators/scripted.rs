use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::TextGenerator;
use crate::error::{ItineraryError, Result};

/// Replays a fixed script of responses and records every prompt it receives
///
/// Used for offline runs and tests. Once the script is exhausted every call
/// fails with a retryable generator error.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|text| Ok(text.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn then_respond(self, text: impl Into<String>) -> Self {
        lock(&self.script).push_back(Ok(text.into()));
        self
    }

    pub fn then_fail(self, error: ItineraryError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.script).pop_front().unwrap_or_else(|| {
            Err(ItineraryError::Generator(
                "scripted generator has no responses left".to_string(),
            ))
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_records_prompts() {
        let generator = ScriptedGenerator::new(["first"])
            .then_fail(ItineraryError::EmptyResponse)
            .then_respond("third");

        tokio_test::block_on(async {
            assert_eq!(generator.generate("a").await.unwrap(), "first");
            assert!(generator.generate("b").await.is_err());
            assert_eq!(generator.generate("c").await.unwrap(), "third");
            assert!(generator.generate("d").await.unwrap_err().is_retryable());
        });

        assert_eq!(generator.prompts(), vec!["a", "b", "c", "d"]);
        assert_eq!(generator.remaining(), 0);
    }
}
