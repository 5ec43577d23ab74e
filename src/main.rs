//! kickstartDS CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use kickstartds::cli::{Cli, CommandDispatcher};
use kickstartds::ui::{Prompter, TerminalPrompter, Theme};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("kickstartds=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kickstartds=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("kickstartDS starting with args: {:?}", cli);

    let theme = Theme::detect();
    let project_root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}", theme.format_error(&format!("Error: {}", e)));
            return ExitCode::from(1);
        }
    };

    let mut prompter: Box<dyn Prompter> = if cli.non_interactive {
        Box::new(TerminalPrompter::non_interactive())
    } else {
        Box::new(TerminalPrompter::new())
    };

    let dispatcher = CommandDispatcher::new(project_root);

    match dispatcher.dispatch(&cli, prompter.as_mut()) {
        Ok(result) => ExitCode::from(result.process_exit_code()),
        Err(e) => {
            eprintln!("{}", theme.format_error(&format!("Error: {}", e)));
            ExitCode::from(1)
        }
    }
}
