pub mod openai;

pub use openai::OpenAiEmbedder;

use crate::error::{MemexError, Result};
use async_trait::async_trait;

/// Seam for embedding providers.
///
/// Implementations must be stable: identical text should embed to the same
/// direction across calls, since callers compare stored vectors against fresh
/// query vectors. A provider failure is surfaced as a retryable
/// `MemexError::Embedding`, never as fabricated output.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut out = self.embed_batch(&texts).await?;
        out.pop()
            .ok_or_else(|| MemexError::Embedding("provider returned no embedding".to_string()))
    }

    /// Vector dimension this provider produces
    fn dimensions(&self) -> usize;
}
