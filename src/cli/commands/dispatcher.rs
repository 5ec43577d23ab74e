//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing the parsed CLI to a command

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::Cli;
use crate::error::{KickstartError, Result};
use crate::logging::LoggerRegistry;
use crate::tasks::{find_tasks_file, load_tasks, TaskFile, TASKS_FILE};
use crate::ui::Prompter;
use crate::workspace::WorkspaceManager;

use super::list::ListCommand;
use super::run::RunCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, asking questions through `prompter`.
    fn execute(&self, prompter: &mut dyn Prompter) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Exit status for the process; a failure never maps to 0.
    pub fn process_exit_code(&self) -> u8 {
        match u8::try_from(self.exit_code) {
            Ok(0) if !self.success => 1,
            Ok(code) => code,
            Err(_) => 1,
        }
    }
}

/// Routes the parsed CLI to the list or run command.
pub struct CommandDispatcher {
    project_root: PathBuf,
    registry: LoggerRegistry,
    workspaces: WorkspaceManager,
}

impl CommandDispatcher {
    /// Dispatcher for `project_root`, logging to files in that directory.
    pub fn new(project_root: PathBuf) -> Self {
        let registry = LoggerRegistry::new(&project_root);
        Self {
            project_root,
            registry,
            workspaces: WorkspaceManager::from_env(),
        }
    }

    /// Replace the logger registry.
    pub fn with_registry(mut self, registry: LoggerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the workspace manager.
    pub fn with_workspaces(mut self, workspaces: WorkspaceManager) -> Self {
        self.workspaces = workspaces;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute the command selected by `cli`.
    pub fn dispatch(&self, cli: &Cli, prompter: &mut dyn Prompter) -> Result<CommandResult> {
        let tasks = self.load_task_file(cli)?;

        if cli.list {
            return ListCommand::new(&tasks).execute(prompter);
        }

        let (Some(module), Some(command)) = (cli.module.as_deref(), cli.command.as_deref()) else {
            return Err(KickstartError::ConfigValidationError {
                message: "a module and a command are required".to_string(),
            });
        };

        let task = tasks.task(module, command)?;
        RunCommand::new(
            &self.project_root,
            &self.registry,
            &self.workspaces,
            module,
            command,
            task,
            cli,
        )
        .execute(prompter)
    }

    fn load_task_file(&self, cli: &Cli) -> Result<TaskFile> {
        let path = match &cli.tasks {
            Some(path) => self.project_root.join(path),
            None => find_tasks_file(&self.project_root).ok_or_else(|| {
                KickstartError::ConfigValidationError {
                    message: format!(
                        "no {} found in {} or any parent directory",
                        TASKS_FILE,
                        self.project_root.display()
                    ),
                }
            })?,
        };
        debug!("Loading tasks from {}", path.display());
        load_tasks(&path)
    }
}
