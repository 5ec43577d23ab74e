//! Run command implementation.
//!
//! `kickstartds <module> <command>` resolves the config, then runs the
//! forward (or, with `--revert`, the revert) phase of the task.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::Cli;
use crate::config::{load_config_file, ConfigResolver, ResolveOptions};
use crate::error::{Result, Severity};
use crate::logging::LoggerRegistry;
use crate::runner::{ProgressDisplay, RunOptions, StepRunner};
use crate::tasks::TaskDefinition;
use crate::telemetry::Telemetry;
use crate::ui::{format_duration, Prompter};
use crate::workspace::WorkspaceManager;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand<'a> {
    project_root: PathBuf,
    registry: &'a LoggerRegistry,
    workspaces: &'a WorkspaceManager,
    module: &'a str,
    command: &'a str,
    task: &'a TaskDefinition,
    args: &'a Cli,
}

impl<'a> RunCommand<'a> {
    pub fn new(
        project_root: &Path,
        registry: &'a LoggerRegistry,
        workspaces: &'a WorkspaceManager,
        module: &'a str,
        command: &'a str,
        task: &'a TaskDefinition,
        args: &'a Cli,
    ) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            registry,
            workspaces,
            module,
            command,
            task,
            args,
        }
    }

    fn resolve_options(&self) -> Result<ResolveOptions> {
        let explicit = match &self.args.config {
            Some(path) => Some(load_config_file(&self.project_root.join(path))?),
            None => None,
        };
        Ok(ResolveOptions {
            explicit,
            rc_only: self.args.rc_only,
            revert: self.args.revert,
        })
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            cleanup: !self.args.no_cleanup,
            progress: if self.args.no_progress {
                ProgressDisplay::Disabled
            } else {
                ProgressDisplay::Terminal
            },
        }
    }
}

impl Command for RunCommand<'_> {
    fn execute(&self, prompter: &mut dyn Prompter) -> Result<CommandResult> {
        self.task.check_prerequisites()?;

        let resolver = ConfigResolver::new(self.module, self.command, &self.project_root);
        let config = resolver.resolve(&self.resolve_options()?, &self.task.prompts(), prompter)?;
        debug!("Resolved config: {}", config);

        let logger = self.registry.get_logger(
            self.module,
            self.args.log_level,
            true,
            self.args.log_file,
            Some(self.command),
        )?;

        if self.args.save_rc && !self.args.revert {
            let path = resolver.save_cache(&config, &self.project_root)?;
            logger.verbose(&format!("Saved config to {}", path.display()));
        }

        let telemetry = Telemetry::from_env();
        let steps = self.task.phase_steps(&config);
        let runner = StepRunner::new(
            self.registry,
            logger.clone(),
            &telemetry,
            self.workspaces,
            self.module,
            self.command,
        )
        .with_options(self.run_options());

        match runner.start(&self.args.instance, &steps, self.args.revert) {
            Ok(report) => {
                logger.info(&format!(
                    "Finished {} in {}",
                    report.phase,
                    format_duration(report.duration)
                ));
                Ok(CommandResult::success())
            }
            Err(e) if e.severity() == Severity::Recoverable => {
                logger.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}
