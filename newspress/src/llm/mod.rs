use anyhow::Result;

/// Core trait for AI engine clients
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate completion for a given prompt
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Send instructions plus the content they apply to, get generated text back.
    ///
    /// Empty parts are dropped; the rest are joined by a blank line and sent as one
    /// user message with the client's defaults.
    async fn process(&self, prompt: &str, content: &str) -> Result<String> {
        let text = [prompt.trim(), content.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if text.is_empty() {
            anyhow::bail!("nothing to send: prompt and content are both empty");
        }

        let response = self
            .generate(LlmRequest {
                prompt: text,
                max_tokens: None,
                temperature: None,
                timeout_seconds: None,
            })
            .await?;
        Ok(response.content)
    }
}

/// Request structure for LLM generation
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

/// Response from LLM generation
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: UsageMetadata,
    pub model: String,
}

/// Token usage metadata
#[derive(Debug, Clone, Default)]
pub struct UsageMetadata {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

pub mod engine;
pub mod factory;
pub mod gemini;
pub mod remote;

pub use engine::EngineKind;
pub use factory::{Agent, AiFactory, FactoryError};
