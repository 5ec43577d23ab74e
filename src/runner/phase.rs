//! Sequential execution of one phase.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{KickstartError, Result, Severity};
use crate::logging::{LogMeta, LogSink, Logger, LoggerRegistry, ProgressSwap};
use crate::progress::{self, ProgressBarSink, ProgressBarState};
use crate::steps::{Step, StepCategory};
use crate::telemetry::{Telemetry, TimingSession};
use crate::ui::format_duration;
use crate::workspace::{WorkspaceGuard, WorkspaceManager};

use super::naming::step_display_name;
use super::PhaseKind;

/// Step lists for a command.
#[derive(Default)]
pub struct PhaseSteps {
    pub checks: Vec<Box<dyn Step>>,
    pub run: Vec<Box<dyn Step>>,
    pub revert: Vec<Box<dyn Step>>,
}

impl PhaseSteps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, step: Box<dyn Step>) -> Self {
        self.checks.push(step);
        self
    }

    pub fn run(mut self, step: Box<dyn Step>) -> Self {
        self.run.push(step);
        self
    }

    pub fn revert(mut self, step: Box<dyn Step>) -> Self {
        self.revert.push(step);
        self
    }
}

/// Where an activated progress bar is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressDisplay {
    /// Draw on stderr and toggle the cursor.
    #[default]
    Terminal,
    /// Keep the estimator running without drawing.
    Hidden,
    /// Never activate a progress bar; log lines stay on the console.
    Disabled,
}

/// Options for running a phase.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Purge the workspace between checks and run steps.
    pub cleanup: bool,
    /// How the progress bar is drawn when timing history activates it.
    pub progress: ProgressDisplay,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cleanup: true,
            progress: ProgressDisplay::Terminal,
        }
    }
}

/// A step that completed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub name: String,
    pub category: StepCategory,
    pub duration: Duration,
}

/// Result of a successful phase.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub identifier: String,
    pub phase: PhaseKind,
    pub steps: Vec<StepOutcome>,
    pub duration: Duration,
    pub progress_active: bool,
    /// Final state of the progress bar, when one was shown.
    pub progress: Option<ProgressBarState>,
}

/// Mutable state threaded through the steps of one phase.
struct PhaseRun<'p, 't> {
    workspace: &'p Path,
    session: &'p mut TimingSession<'t>,
    outcomes: Vec<StepOutcome>,
    index: usize,
    total: usize,
}

/// Runs the checks, cleanup and run steps (or the revert steps) of a command.
pub struct StepRunner<'a> {
    registry: &'a LoggerRegistry,
    logger: Logger,
    telemetry: &'a Telemetry,
    workspaces: &'a WorkspaceManager,
    module: String,
    command: String,
    options: RunOptions,
}

impl<'a> StepRunner<'a> {
    /// Create a runner; `logger` must come from `registry`.
    pub fn new(
        registry: &'a LoggerRegistry,
        logger: Logger,
        telemetry: &'a Telemetry,
        workspaces: &'a WorkspaceManager,
        module: &str,
        command: &str,
    ) -> Self {
        Self {
            registry,
            logger,
            telemetry,
            workspaces,
            module: module.to_string(),
            command: command.to_string(),
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one phase inside the workspace for `identifier`.
    ///
    /// The first failing step aborts the phase with
    /// [`KickstartError::StepFailed`]. Timings of the steps that completed
    /// are still written, the console sink is restored and the workspace is
    /// left as-is.
    pub fn start(&self, identifier: &str, steps: &PhaseSteps, revert: bool) -> Result<PhaseReport> {
        let phase = if revert {
            PhaseKind::Revert
        } else {
            PhaseKind::Forward
        };
        let total = match phase {
            PhaseKind::Forward => steps.checks.len() + steps.run.len(),
            PhaseKind::Revert => steps.revert.len(),
        };
        debug!(
            "Starting {} phase of {} {} ({}) with {} steps",
            phase, self.module, self.command, identifier, total
        );

        let started = Instant::now();
        let workspace = self
            .workspaces
            .enter(&self.module, &self.command, identifier)?;

        let mut progress = self.activate_progress()?;
        let progress_active = progress.is_some();

        let mut session =
            self.telemetry
                .start_session(&self.module, &self.command, Some(identifier), phase);
        let mut run = PhaseRun {
            workspace: workspace.path(),
            session: &mut session,
            outcomes: Vec::new(),
            index: 0,
            total,
        };
        let result = self.execute(phase, steps, &workspace, &mut run);
        let outcomes = run.outcomes;

        let progress_state = progress.as_ref().map(|(_, bar)| bar.state());
        if let Some((swap, _)) = progress.as_mut() {
            swap.restore();
        }
        drop(progress);
        if progress_active && self.options.progress == ProgressDisplay::Terminal {
            progress::show_cursor();
        }

        let flushed = session
            .finish()
            .or_else(|e| self.tolerate("Could not record step timings", e));

        let exited = workspace.exit();
        result?;
        flushed?;
        exited?;

        let duration = started.elapsed();
        debug!(
            "Finished {} phase of {} {} in {}",
            phase,
            self.module,
            self.command,
            format_duration(duration)
        );

        Ok(PhaseReport {
            identifier: identifier.to_string(),
            phase,
            steps: outcomes,
            duration,
            progress_active,
            progress: progress_state,
        })
    }

    fn execute(
        &self,
        phase: PhaseKind,
        steps: &PhaseSteps,
        workspace: &WorkspaceGuard,
        run: &mut PhaseRun<'_, '_>,
    ) -> Result<()> {
        match phase {
            PhaseKind::Forward => {
                for step in &steps.checks {
                    self.run_step(run, step.as_ref(), StepCategory::Check)?;
                }
                if self.options.cleanup {
                    debug!("Cleaning workspace {}", workspace.path().display());
                    workspace.cleanup()?;
                }
                for step in &steps.run {
                    self.run_step(run, step.as_ref(), StepCategory::Run)?;
                }
            }
            PhaseKind::Revert => {
                for step in &steps.revert {
                    self.run_step(run, step.as_ref(), StepCategory::Revert)?;
                }
            }
        }
        Ok(())
    }

    fn run_step(&self, run: &mut PhaseRun<'_, '_>, step: &dyn Step, category: StepCategory) -> Result<()> {
        let name = step_display_name(step.id());
        run.index += 1;

        let step_logger = self.logger.child(LogMeta::for_step(
            &self.command,
            &name,
            run.index,
            run.total,
        ));
        step_logger.step_started();
        step_logger.info(&format!("Starting {}", category));

        run.session.step_started(&name, category);
        let step_start = Instant::now();
        let result = step.run(&step_logger, run.workspace);
        let duration = step_start.elapsed();

        let failure = match result {
            Ok(true) => None,
            Ok(false) => Some("step reported failure".to_string()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(message) = failure {
            debug!("Step {} failed after {}", name, format_duration(duration));
            return Err(KickstartError::StepFailed {
                step: name,
                message,
            });
        }

        run.session.step_finished(&name);
        step_logger.verbose(&format!("Finished in {}", format_duration(duration)));
        step_logger.step_complete();

        run.outcomes.push(StepOutcome {
            name,
            category,
            duration,
        });
        Ok(())
    }

    /// Warn about advisory errors and carry on; anything else is returned.
    fn tolerate(&self, context: &str, err: KickstartError) -> Result<()> {
        match err.severity() {
            Severity::Advisory => {
                self.logger.utility().warn(&format!("{}: {}", context, err));
                Ok(())
            }
            Severity::Fatal | Severity::Recoverable => Err(err),
        }
    }

    fn activate_progress(&self) -> Result<Option<(ProgressSwap, Arc<ProgressBarSink>)>> {
        if !self.telemetry.is_active() || self.options.progress == ProgressDisplay::Disabled {
            return Ok(None);
        }

        let averages = match self
            .telemetry
            .average_durations(&self.module, &self.command)
        {
            Ok(averages) => averages,
            Err(e) => {
                self.tolerate("Could not load step timings", e)?;
                return Ok(None);
            }
        };

        if !progress::should_activate(&averages) {
            debug!(
                "No progress bar for {} {}: {} historical samples",
                self.module,
                self.command,
                averages.len()
            );
            return Ok(None);
        }

        let bar = Arc::new(match self.options.progress {
            ProgressDisplay::Terminal => ProgressBarSink::new(&averages),
            ProgressDisplay::Hidden | ProgressDisplay::Disabled => {
                ProgressBarSink::hidden(&averages)
            }
        });
        let sink: Arc<dyn LogSink> = Arc::clone(&bar) as Arc<dyn LogSink>;
        Ok(self
            .registry
            .install_progress(self.logger.label(), sink)
            .map(|swap| (swap, bar)))
    }
}
