use crate::error::MedibotError;

/// # CORE
/// Chat completion. Implementations return `None` when the model's reply
/// carries no extractable answer text; picking the fallback is up to the
/// caller.
#[async_trait::async_trait]
pub trait Llm {
    fn id(&self) -> &'static str;

    /// Generate an answer for `user` under the `system` instruction.
    async fn complete(&self, system: &str, user: &str) -> Result<Option<String>, MedibotError>;
}
