//! Step contract and built-in step adapters.
//!
//! A step is a named unit of work run inside a phase's workspace:
//!
//! - [`Step`] - the contract every step implements
//! - [`FnStep`] - adapts a named closure
//! - [`ShellStep`] - runs a shell command and streams its output to the step logger
//! - [`retry_until`] - bounded polling helper for step authors
//!
//! # Example
//!
//! ```
//! use kickstartds::steps::{FnStep, Step};
//!
//! let step = FnStep::new("checkPrerequisites", |logger, _workspace| {
//!     logger.info("all good");
//!     Ok(true)
//! });
//! assert_eq!(step.id(), "checkPrerequisites");
//! ```

pub mod retry;
pub mod shell;

pub use retry::retry_until;
pub use shell::ShellStep;

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::logging::Logger;

/// A named operation executed within a workspace.
///
/// `Ok(true)` is success, `Ok(false)` a declared failure and `Err` a fatal
/// failure. Either failure aborts the rest of the phase.
pub trait Step {
    /// Immutable identifier, e.g. `checkPrerequisites`.
    fn id(&self) -> &str;

    /// Execute the step.
    fn run(&self, logger: &Logger, workspace: &Path) -> Result<bool>;
}

/// Which list of a phase a step came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepCategory {
    Check,
    Run,
    Revert,
}

impl StepCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepCategory::Check => "check",
            StepCategory::Run => "run",
            StepCategory::Revert => "revert",
        }
    }
}

impl fmt::Display for StepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step backed by a closure.
pub struct FnStep<F> {
    id: String,
    f: F,
}

impl<F> FnStep<F>
where
    F: Fn(&Logger, &Path) -> Result<bool>,
{
    pub fn new(id: impl Into<String>, f: F) -> Self {
        Self { id: id.into(), f }
    }
}

impl<F> FnStep<F>
where
    F: Fn(&Logger, &Path) -> Result<bool> + 'static,
{
    /// Box the step for use in a phase list.
    pub fn boxed(id: impl Into<String>, f: F) -> Box<dyn Step> {
        Box::new(Self::new(id, f))
    }
}

impl<F> Step for FnStep<F>
where
    F: Fn(&Logger, &Path) -> Result<bool>,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, logger: &Logger, workspace: &Path) -> Result<bool> {
        (self.f)(logger, workspace)
    }
}

impl<F> fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").field("id", &self.id).finish()
    }
}
