//! kickstartDS - Phase-based task orchestration.
//!
//! Every kickstartDS command (`tokens compile`, `cms init`, ...) runs as a
//! phase: a list of named check steps, a workspace cleanup and a list of run
//! steps, or alternatively a list of revert steps. Steps run one after the
//! other inside a per-invocation temporary workspace, each with its own
//! scoped logger. Step durations are optionally recorded to InfluxDB and
//! drive a progress bar on later runs.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Run-control files and configuration resolution
//! - [`error`] - Error types and result aliases
//! - [`logging`] - Named loggers with console, file and progress sinks
//! - [`progress`] - Progress estimation and the progress bar sink
//! - [`runner`] - Phase execution
//! - [`shell`] - Shell command execution and prerequisite lookup
//! - [`steps`] - The step contract and step adapters
//! - [`tasks`] - Declarative task files
//! - [`telemetry`] - Step timing storage and queries
//! - [`ui`] - Interactive prompts and terminal styling
//! - [`workspace`] - Per-invocation temporary directories
//!
//! # Example
//!
//! ```
//! use kickstartds::runner::step_display_name;
//!
//! assert_eq!(step_display_name("compileTokens"), "compile-tokens");
//! ```
//!
//! For running whole phases, see [`runner::StepRunner`] and the
//! integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod tasks;
pub mod telemetry;
pub mod ui;
pub mod workspace;

pub use error::{KickstartError, Result};
