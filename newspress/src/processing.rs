use anyhow::{Context, Result};
use tracing::info;

use crate::llm::Agent;
use crate::prompts::PromptManager;

/// Result of running one task through the active agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub task: String,
    pub engine: String,
    pub text: String,
}

/// Render the prompt for `task` and send it to `agent`.
///
/// The prompt is rendered before any request is made, so an unknown task fails
/// without touching the network.
pub async fn run_task(
    agent: &Agent,
    prompts: &PromptManager,
    task: &str,
    content: &str,
) -> Result<TaskOutput> {
    let prompt = prompts.prompt(task, content)?;

    info!(task, engine = agent.engine(), chars = content.len(), "running task");
    let text = agent
        .process(&prompt, "")
        .await
        .with_context(|| format!("task '{}' failed on engine '{}'", task, agent.engine()))?;

    Ok(TaskOutput {
        task: task.to_string(),
        engine: agent.engine().to_string(),
        text: text.trim().to_string(),
    })
}
