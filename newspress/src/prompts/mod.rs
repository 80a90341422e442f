//! Task → prompt template catalog.
//!
//! Downstream code never writes prompt text itself: it asks the [`PromptManager`] for
//! the prompt of a named task and sends the result to whichever agent is active.

use std::sync::OnceLock;

use thiserror::Error;

mod builtin;

/// Placeholder in a template where the article content is inserted.
pub const CONTENT_SLOT: &str = "{content}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("unknown task '{task}'")]
    UnknownTask { task: String },

    #[error("task '{task}' is registered twice")]
    DuplicateTask { task: String },

    #[error("template for task '{task}' has no {{content}} slot")]
    MissingContentSlot { task: String },
}

/// Prompt text for one task, immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    task: String,
    description: String,
    template: String,
}

impl PromptTemplate {
    pub fn new(
        task: impl Into<String>,
        description: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            task: task.into(),
            description: description.into(),
            template: template.into(),
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute `content` into every slot. Slots inside `content` are left alone.
    pub fn render(&self, content: &str) -> String {
        self.template.replace(CONTENT_SLOT, content)
    }
}

/// Fixed catalog of prompt templates, in registration order.
#[derive(Debug, Clone)]
pub struct PromptManager {
    templates: Vec<PromptTemplate>,
}

static GLOBAL: OnceLock<PromptManager> = OnceLock::new();

impl PromptManager {
    /// Build a catalog. Task names must be unique and every template needs a content slot.
    pub fn new(templates: impl IntoIterator<Item = PromptTemplate>) -> Result<Self, PromptError> {
        let mut manager = Self {
            templates: Vec::new(),
        };
        for template in templates {
            manager = manager.with_template(template)?;
        }
        Ok(manager)
    }

    /// The built-in news-processing catalog.
    pub fn builtin() -> Self {
        Self {
            templates: builtin::templates(),
        }
    }

    /// Process-wide shared catalog, built on first use.
    ///
    /// Tests and embedders that need isolation should construct their own with
    /// [`PromptManager::new`] or [`PromptManager::builtin`].
    pub fn global() -> &'static PromptManager {
        GLOBAL.get_or_init(Self::builtin)
    }

    /// Append a template, returning the extended catalog.
    pub fn with_template(mut self, template: PromptTemplate) -> Result<Self, PromptError> {
        if self.templates.iter().any(|t| t.task == template.task) {
            return Err(PromptError::DuplicateTask {
                task: template.task,
            });
        }
        if !template.template.contains(CONTENT_SLOT) {
            return Err(PromptError::MissingContentSlot {
                task: template.task,
            });
        }
        self.templates.push(template);
        Ok(self)
    }

    pub fn available_tasks(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.task.as_str()).collect()
    }

    pub fn template(&self, task: &str) -> Result<&PromptTemplate, PromptError> {
        self.templates
            .iter()
            .find(|t| t.task == task)
            .ok_or_else(|| PromptError::UnknownTask {
                task: task.to_string(),
            })
    }

    pub fn task_description(&self, task: &str) -> Result<&str, PromptError> {
        self.template(task).map(PromptTemplate::description)
    }

    /// Render the prompt for `task` around `content`.
    pub fn prompt(&self, task: &str, content: &str) -> Result<String, PromptError> {
        self.template(task).map(|t| t.render(content))
    }
}
