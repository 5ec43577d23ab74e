//! Task file schema.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{KickstartError, Result};
use crate::runner::step_display_name;
use crate::ui::{Prompt, PromptOption, PromptType};

/// Root of `.kickstartds/tasks.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFile {
    /// Tasks by module name, then command name.
    pub modules: BTreeMap<String, BTreeMap<String, TaskDefinition>>,
}

/// Everything needed to run one `<module> <command>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDefinition {
    /// One-line description shown by `--list`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// External commands that must be on `PATH`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Questions whose answers form the config.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<PromptConfig>,

    /// Steps run before the workspace cleanup.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<StepConfig>,

    /// Steps run after the workspace cleanup.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub run: Vec<StepConfig>,

    /// Steps run by `--revert`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revert: Vec<StepConfig>,
}

/// A shell step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Step identifier, e.g. `compileTokens`.
    pub name: String,

    /// Shell command, run inside the workspace.
    pub run: String,

    /// Extra environment variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// A question asked while resolving the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Dotted property path for the answer.
    pub key: String,

    pub question: String,

    #[serde(rename = "type", default)]
    pub prompt_type: PromptKind,

    /// Options for select/multiselect.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PromptOptionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
}

/// Type of interactive prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Input,
    Confirm,
    Select,
    Multiselect,
}

/// Option for select/multiselect prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOptionConfig {
    pub label: String,
    pub value: String,
}

impl TaskFile {
    /// Task for a module and command.
    pub fn task(&self, module: &str, command: &str) -> Result<&TaskDefinition> {
        self.modules
            .get(module)
            .and_then(|commands| commands.get(command))
            .ok_or_else(|| KickstartError::TaskNotFound {
                module: module.to_string(),
                command: command.to_string(),
            })
    }

    /// `(module, command, description)` for every task, sorted.
    pub fn list(&self) -> Vec<(&str, &str, Option<&str>)> {
        self.modules
            .iter()
            .flat_map(|(module, commands)| {
                commands.iter().map(move |(command, task)| {
                    (module.as_str(), command.as_str(), task.description.as_deref())
                })
            })
            .collect()
    }

    /// Check every task for structural mistakes.
    pub fn validate(&self) -> Result<()> {
        for (module, commands) in &self.modules {
            for (command, task) in commands {
                task.validate()
                    .map_err(|message| KickstartError::ConfigValidationError {
                        message: format!("{} {}: {}", module, command, message),
                    })?;
            }
        }
        Ok(())
    }
}

impl TaskDefinition {
    fn validate(&self) -> std::result::Result<(), String> {
        let mut forward = HashSet::new();
        for step in self.checks.iter().chain(&self.run) {
            validate_step(step)?;
            if !forward.insert(step_display_name(&step.name)) {
                return Err(format!("duplicate step name '{}'", step.name));
            }
        }

        let mut revert = HashSet::new();
        for step in &self.revert {
            validate_step(step)?;
            if !revert.insert(step_display_name(&step.name)) {
                return Err(format!("duplicate revert step name '{}'", step.name));
            }
        }

        for prompt in &self.prompts {
            if prompt.key.trim().is_empty() {
                return Err("prompt with an empty key".to_string());
            }
            let needs_options = matches!(prompt.prompt_type, PromptKind::Select | PromptKind::Multiselect);
            if needs_options && prompt.options.is_empty() {
                return Err(format!("prompt '{}' has no options", prompt.key));
            }
        }
        Ok(())
    }

    /// Prompts in the form the config resolver asks them.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.iter().map(PromptConfig::to_prompt).collect()
    }
}

fn validate_step(step: &StepConfig) -> std::result::Result<(), String> {
    if step.name.trim().is_empty() {
        return Err("step with an empty name".to_string());
    }
    if step.run.trim().is_empty() {
        return Err(format!("step '{}' has no command", step.name));
    }
    Ok(())
}

impl PromptConfig {
    pub fn to_prompt(&self) -> Prompt {
        let options = || {
            self.options
                .iter()
                .map(|o| PromptOption {
                    label: o.label.clone(),
                    value: o.value.clone(),
                })
                .collect()
        };
        let prompt_type = match self.prompt_type {
            PromptKind::Input => PromptType::Input,
            PromptKind::Confirm => PromptType::Confirm,
            PromptKind::Select => PromptType::Select { options: options() },
            PromptKind::Multiselect => PromptType::MultiSelect { options: options() },
        };

        Prompt {
            key: self.key.clone(),
            question: self.question.clone(),
            prompt_type,
            default: self.default.as_ref().and_then(yaml_default),
        }
    }
}

fn yaml_default(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Sequence(items) => Some(
            items
                .iter()
                .filter_map(yaml_default)
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}
