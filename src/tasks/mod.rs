//! Declarative task definitions.
//!
//! The `kickstartds` binary reads its steps from `.kickstartds/tasks.yml`,
//! found by walking up from the working directory. Each task lists the
//! external commands it needs, the prompts that form its config, and its
//! check, run and revert steps as shell commands.
//!
//! Shell steps see the resolved config as `KS_*` environment variables:
//! `cms.schemaPath` becomes `KS_CMS_SCHEMA_PATH`.

pub mod schema;

pub use schema::{PromptConfig, PromptKind, StepConfig, TaskDefinition, TaskFile};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{KickstartError, Result};
use crate::runner::{step_display_name, PhaseSteps};
use crate::shell::require_command;
use crate::steps::{ShellStep, Step};

/// Task file location relative to a project directory.
pub const TASKS_FILE: &str = ".kickstartds/tasks.yml";

/// Prefix of config environment variables.
pub const ENV_PREFIX: &str = "KS";

/// Find the nearest task file at or above `start`.
pub fn find_tasks_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(TASKS_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate a task file.
pub fn load_tasks(path: &Path) -> Result<TaskFile> {
    let content = fs::read_to_string(path)?;
    let file: TaskFile =
        serde_yaml::from_str(&content).map_err(|e| KickstartError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    file.validate()?;
    Ok(file)
}

impl TaskDefinition {
    /// Fail with `PrerequisiteMissing` for the first required command not on `PATH`.
    pub fn check_prerequisites(&self) -> Result<()> {
        for command in &self.requires {
            require_command(command)?;
        }
        Ok(())
    }

    /// Shell steps for every phase, with `config` exported to their environment.
    pub fn phase_steps(&self, config: &Value) -> PhaseSteps {
        let config_env = config_env(config);
        let to_steps = |configs: &[StepConfig]| {
            configs
                .iter()
                .map(|step| {
                    let mut env = config_env.clone();
                    env.extend(step.env.iter().map(|(k, v)| (k.clone(), v.clone())));
                    Box::new(ShellStep::new(&step.name, &step.run).with_env(env)) as Box<dyn Step>
                })
                .collect()
        };

        PhaseSteps {
            checks: to_steps(&self.checks),
            run: to_steps(&self.run),
            revert: to_steps(&self.revert),
        }
    }
}

/// Flatten a config into `KS_*` environment variables.
///
/// Path segments are upper-snake-cased and joined with `_`; lists are
/// comma-joined and nulls are skipped.
pub fn config_env(config: &Value) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    collect_env(config, ENV_PREFIX.to_string(), &mut vars);
    vars
}

fn collect_env(value: &Value, name: String, vars: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_env(child, format!("{}_{}", name, env_segment(key)), vars);
            }
        }
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(scalar_string).collect();
            vars.push((name, joined.join(",")));
        }
        Value::Null => {}
        other => {
            if let Some(s) = scalar_string(other) {
                vars.push((name, s));
            }
        }
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn env_segment(key: &str) -> String {
    step_display_name(key)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}
