//! Turns a validated [`Configuration`] into a ready-to-use [`Agent`].
//!
//! Callers ask for "the agent" and get a handle with one capability, `process`;
//! which backend sits behind it is decided here and nowhere else.

use std::fmt;
use std::sync::Arc;

use common::{Configuration, EngineConfig};
use thiserror::Error;
use tracing::info;

use super::engine::EngineKind;
use super::gemini::GeminiProvider;
use super::remote::RemoteLlmProvider;
use super::LlmProvider;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_TOKENS: usize = 500;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown engine '{engine}': {reason}")]
    UnknownEngine { engine: String, reason: String },

    #[error("engine '{engine}' ({kind}) needs an API key but none is configured")]
    MissingApiKey { engine: String, kind: EngineKind },
}

/// Engine-agnostic handle over a constructed AI client.
#[derive(Clone)]
pub struct Agent {
    name: String,
    kind: EngineKind,
    model: String,
    provider: Arc<dyn LlmProvider>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        kind: EngineKind,
        model: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            model: model.into(),
            provider,
        }
    }

    /// Configured engine name (the key under `ai.engines`).
    pub fn engine(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        self.provider.clone()
    }

    /// Send a prompt and the content it applies to; returns the generated text.
    pub async fn process(&self, prompt: &str, content: &str) -> anyhow::Result<String> {
        self.provider.process(prompt, content).await
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Stateless engine dispatcher.
pub struct AiFactory;

impl AiFactory {
    /// Build the agent selected by `config`.
    ///
    /// Returns `Ok(None)` when AI is disabled. `ai.engine` takes precedence over
    /// `ai.defaultEngine`. No network traffic happens here.
    pub fn get_agent(config: &Configuration) -> Result<Option<Agent>, FactoryError> {
        if !config.ai.enabled {
            info!("AI disabled in configuration; no agent created");
            return Ok(None);
        }

        let name = config.ai.active_engine();
        let engine = config
            .ai
            .engines
            .get(name)
            .ok_or_else(|| FactoryError::UnknownEngine {
                engine: name.to_string(),
                reason: "not defined under ai.engines".to_string(),
            })?;

        Self::build(name, engine).map(Some)
    }

    /// Build an agent for one `ai.engines` entry.
    pub fn build(name: &str, engine: &EngineConfig) -> Result<Agent, FactoryError> {
        let kind = engine
            .provider
            .as_deref()
            .unwrap_or(name)
            .parse::<EngineKind>()
            .map_err(|reason| FactoryError::UnknownEngine {
                engine: name.to_string(),
                reason,
            })?;

        let api_key = engine.api_key.expose();
        if api_key.is_empty() && kind.requires_api_key() {
            return Err(FactoryError::MissingApiKey {
                engine: name.to_string(),
                kind,
            });
        }

        let base_url = engine
            .base_url
            .clone()
            .unwrap_or_else(|| kind.default_base_url().to_string());
        let model = engine
            .model
            .clone()
            .unwrap_or_else(|| kind.default_model().to_string());
        let timeout_secs = engine.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_tokens = engine.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = engine.temperature.unwrap_or(DEFAULT_TEMPERATURE);

        let provider: Arc<dyn LlmProvider> = match kind {
            EngineKind::OpenAi | EngineKind::DeepSeek | EngineKind::Qwen | EngineKind::Ollama => {
                Arc::new(
                    RemoteLlmProvider::new(base_url, api_key, model.clone())
                        .with_defaults(timeout_secs, max_tokens, temperature),
                )
            }
            EngineKind::Gemini => Arc::new(
                GeminiProvider::new(base_url, api_key, model.clone())
                    .with_defaults(timeout_secs, max_tokens, temperature),
            ),
        };

        info!(engine = %name, %kind, model = %model, "AI agent initialized");
        Ok(Agent::new(name, kind, model, provider))
    }
}
