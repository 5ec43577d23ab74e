//! Shell command execution and process-wide shell state.

pub mod command;

pub use command::{execute, execute_streaming, CommandOptions, CommandResult, OutputLine};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{KickstartError, Result};

static ECHO_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Whether shell steps should skip echoing their command line.
pub fn echo_suppressed() -> bool {
    ECHO_SUPPRESSED.load(Ordering::SeqCst)
}

/// Set the command echo flag, returning the previous value.
pub fn set_echo_suppressed(suppressed: bool) -> bool {
    ECHO_SUPPRESSED.swap(suppressed, Ordering::SeqCst)
}

/// Locate an external command on `PATH`.
pub fn require_command(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| KickstartError::PrerequisiteMissing {
        command: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn require_command_finds_sh() {
        assert!(require_command("sh").is_ok());
    }

    #[test]
    fn require_command_reports_missing_prerequisite() {
        let err = require_command("kickstartds-surely-not-installed").unwrap_err();
        assert!(matches!(
            err,
            KickstartError::PrerequisiteMissing { ref command } if command == "kickstartds-surely-not-installed"
        ));
    }
}
