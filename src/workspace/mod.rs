//! Per-phase temporary workspaces.
//!
//! A workspace lives at `{tmp_root}/{module}-{command}-{identifier}`. It is
//! created on demand, optionally purged before the run steps, and never
//! removed automatically so a failed phase can be inspected.
//!
//! Entering a workspace changes the process working directory and sets the
//! command echo flag. Both are process-wide, so [`WorkspaceGuard`] also holds
//! a process-wide lock: a second phase in the same process waits until the
//! first guard is released.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::Result;
use crate::shell;

/// Environment variable overriding the workspace root.
pub const TMP_DIR_ENV: &str = "KICKSTARTDS_TMP_DIR";

static WORKSPACE_LOCK: Mutex<()> = Mutex::new(());

/// Computes workspace paths and enters them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceManager {
    tmp_root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(tmp_root: impl Into<PathBuf>) -> Self {
        Self {
            tmp_root: tmp_root.into(),
        }
    }

    /// Root from `KICKSTARTDS_TMP_DIR`, falling back to the OS temp directory.
    pub fn from_env() -> Self {
        match std::env::var(TMP_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir),
            _ => Self::new(std::env::temp_dir()),
        }
    }

    pub fn tmp_root(&self) -> &Path {
        &self.tmp_root
    }

    /// Deterministic workspace path for a phase.
    pub fn path_for(&self, module: &str, command: &str, identifier: &str) -> PathBuf {
        self.tmp_root
            .join(format!("{}-{}-{}", module, command, identifier))
    }

    /// Create the workspace if needed and make it the working directory.
    ///
    /// Blocks while another guard in this process is alive.
    pub fn enter(&self, module: &str, command: &str, identifier: &str) -> Result<WorkspaceGuard> {
        let lock = WORKSPACE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let path = self.path_for(module, command, identifier);
        fs::create_dir_all(&path)?;

        let previous_dir = std::env::current_dir()?;
        std::env::set_current_dir(&path)?;
        let previous_echo = shell::set_echo_suppressed(true);
        debug!("Entered workspace {}", path.display());

        Ok(WorkspaceGuard {
            path,
            previous_dir,
            previous_echo,
            exited: false,
            _lock: lock,
        })
    }
}

/// An entered workspace.
///
/// Dropping the guard (or calling [`exit`](Self::exit)) restores the previous
/// working directory and echo flag, then releases the process-wide lock.
/// This also happens during panic unwinding.
#[derive(Debug)]
pub struct WorkspaceGuard {
    path: PathBuf,
    previous_dir: PathBuf,
    previous_echo: bool,
    exited: bool,
    _lock: MutexGuard<'static, ()>,
}

impl WorkspaceGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete everything in the workspace, dotfiles included, and recreate it.
    pub fn cleanup(&self) -> Result<()> {
        debug!("Cleaning workspace {}", self.path.display());
        if self.path.exists() {
            for entry in fs::read_dir(&self.path)? {
                let entry = entry?;
                let entry_path = entry.path();
                if entry.file_type()?.is_dir() {
                    fs::remove_dir_all(&entry_path)?;
                } else {
                    fs::remove_file(&entry_path)?;
                }
            }
        }
        fs::create_dir_all(&self.path)?;
        Ok(())
    }

    /// Leave the workspace, reporting a failure to restore the previous directory.
    pub fn exit(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        if self.exited {
            return Ok(());
        }
        self.exited = true;
        shell::set_echo_suppressed(self.previous_echo);
        std::env::set_current_dir(&self.previous_dir)?;
        debug!("Left workspace {}", self.path.display());
        Ok(())
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(
                "Failed to restore working directory {}: {}",
                self.previous_dir.display(),
                e
            );
        }
    }
}
