//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

use crate::logging::LogLevel;

/// kickstartDS - Run module commands as check, run and revert phases.
#[derive(Debug, Clone, Parser)]
#[command(name = "kickstartds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Module to run (e.g. `tokens`)
    #[arg(required_unless_present = "list")]
    pub module: Option<String>,

    /// Command of the module (e.g. `compile`)
    #[arg(required_unless_present = "list")]
    pub command: Option<String>,

    /// Run the revert steps instead of checks and run steps
    #[arg(long)]
    pub revert: bool,

    /// Use the cached rc file without prompting
    #[arg(long)]
    pub rc_only: bool,

    /// Keep files left in the workspace by earlier runs
    #[arg(long)]
    pub no_cleanup: bool,

    /// Workspace instance identifier
    #[arg(long, default_value = "default")]
    pub instance: String,

    /// Use this config file instead of prompting
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Save the resolved config as an rc file in the current directory
    #[arg(long)]
    pub save_rc: bool,

    /// Path to the task file (overrides discovery of .kickstartds/tasks.yml)
    #[arg(long, env = "KICKSTARTDS_TASKS")]
    pub tasks: Option<PathBuf>,

    /// Also write a log file
    #[arg(long)]
    pub log_file: bool,

    /// Minimum level for step output (error, warn, info, verbose, debug)
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Never show the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Use defaults, no prompts
    #[arg(long)]
    pub non_interactive: bool,

    /// List the tasks of the task file
    #[arg(long)]
    pub list: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_and_command() {
        let cli = Cli::try_parse_from(["kickstartds", "tokens", "compile"]).unwrap();

        assert_eq!(cli.module.as_deref(), Some("tokens"));
        assert_eq!(cli.command.as_deref(), Some("compile"));
        assert_eq!(cli.instance, "default");
        assert_eq!(cli.log_level, LogLevel::Info);
        assert!(!cli.revert);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "kickstartds",
            "cms",
            "init",
            "--revert",
            "--rc-only",
            "--no-cleanup",
            "--instance",
            "site-a",
            "--log-level",
            "debug",
            "--log-file",
        ])
        .unwrap();

        assert!(cli.revert);
        assert!(cli.rc_only);
        assert!(cli.no_cleanup);
        assert!(cli.log_file);
        assert_eq!(cli.instance, "site-a");
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn module_is_required_without_list() {
        assert!(Cli::try_parse_from(["kickstartds"]).is_err());
        assert!(Cli::try_parse_from(["kickstartds", "--list"]).is_ok());
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["kickstartds", "a", "b", "--log-level", "loud"]).is_err());
    }
}
