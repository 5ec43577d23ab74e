//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. The
//! [`CommandDispatcher`] loads the task file and routes to:
//! - [`list`] for `kickstartds --list`
//! - [`run`] for `kickstartds <module> <command>`

pub mod dispatcher;
pub mod list;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
