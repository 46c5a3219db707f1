use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// Opaque text-generation capability: one prompt in, free-form text out
///
/// Implementations must be shareable across concurrent requests; the pipeline
/// itself never issues two calls at once for the same request.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short label used in logs
    fn name(&self) -> &str {
        "generator"
    }
}

#[async_trait]
impl<T> TextGenerator for Arc<T>
where
    T: TextGenerator + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T> TextGenerator for Box<T>
where
    T: TextGenerator + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
