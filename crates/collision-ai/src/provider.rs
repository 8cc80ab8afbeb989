use async_trait::async_trait;

/// Result type for LLM operations.
pub type LlmResult<T> = anyhow::Result<T>;

/// A fallible text-completion hook.
///
/// Callers own the deadline (see the enhancer); implementations perform a
/// single attempt and never retry.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a system/user prompt pair.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> LlmResult<String>;

    fn provider_name(&self) -> &str;
}
