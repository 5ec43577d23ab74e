//! Process-scoped registry of named loggers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::error::Result;

use super::file::next_log_path;
use super::{ConsoleSink, FileSink, LogLevel, LogMeta, LogSink, Logger, LoggerCore, Sinks};

type ConsoleFactory = Box<dyn Fn() -> Arc<dyn LogSink> + Send + Sync>;

/// Registry of loggers keyed by label.
///
/// Owned by the command invocation and passed to whatever needs a logger.
pub struct LoggerRegistry {
    log_dir: PathBuf,
    loggers: Mutex<HashMap<String, Arc<LoggerCore>>>,
    console_factory: ConsoleFactory,
}

impl LoggerRegistry {
    /// Create a registry writing log files into `log_dir`.
    pub fn new(log_dir: &Path) -> Self {
        Self {
            log_dir: log_dir.to_path_buf(),
            loggers: Mutex::new(HashMap::new()),
            console_factory: Box::new(|| Arc::new(ConsoleSink::new()) as Arc<dyn LogSink>),
        }
    }

    /// Create a registry writing log files into the current directory.
    pub fn in_current_dir() -> Result<Self> {
        Ok(Self::new(&std::env::current_dir()?))
    }

    /// Replace the factory used whenever a console sink is attached.
    pub fn with_console_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn LogSink> + Send + Sync + 'static,
    {
        self.console_factory = Box::new(factory);
        self
    }

    /// Directory log files are created in.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Get the logger for `label`, creating it on first use.
    ///
    /// Later calls reconcile the console and file sinks with the requested
    /// flags and update the level; the logger identity is kept so child
    /// loggers created earlier stay attached.
    pub fn get_logger(
        &self,
        label: &str,
        level: LogLevel,
        use_console: bool,
        use_file: bool,
        command: Option<&str>,
    ) -> Result<Logger> {
        let core = {
            let mut loggers = self.loggers.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(loggers.entry(label.to_string()).or_insert_with(|| {
                debug!("Creating logger '{}'", label);
                Arc::new(LoggerCore {
                    label: label.to_string(),
                    level: RwLock::new(level),
                    sinks: RwLock::new(Sinks::default()),
                })
            }))
        };

        *core.level.write().unwrap_or_else(|e| e.into_inner()) = level;

        {
            let mut sinks = core.sinks.write().unwrap_or_else(|e| e.into_inner());

            if use_console {
                // A parked console comes back when the progress sink is removed.
                if sinks.console.is_none() && sinks.parked_console.is_none() {
                    sinks.console = Some((self.console_factory)());
                }
            } else {
                sinks.console = None;
                sinks.parked_console = None;
            }

            if use_file {
                if sinks.file.is_none() {
                    let path = next_log_path(&self.log_dir, label, command);
                    debug!("Logger '{}' writing to {}", label, path.display());
                    sinks.file = Some(Arc::new(FileSink::open(&path)?));
                }
            } else if let Some(file) = sinks.file.take() {
                file.close();
            }
        }

        let meta = LogMeta {
            command: command.map(String::from),
            ..Default::default()
        };
        Ok(Logger::from_core(core, meta))
    }

    /// Swap the console sink of `label` for `sink` until the guard is restored.
    ///
    /// Returns `None` if no logger with that label exists.
    pub fn install_progress(&self, label: &str, sink: Arc<dyn LogSink>) -> Option<ProgressSwap> {
        let core = {
            let loggers = self.loggers.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(loggers.get(label)?)
        };

        {
            let mut sinks = core.sinks.write().unwrap_or_else(|e| e.into_inner());
            if let Some(console) = sinks.console.take() {
                sinks.parked_console = Some(console);
            }
            if let Some(previous) = sinks.progress.replace(sink) {
                previous.close();
            }
        }

        Some(ProgressSwap {
            core,
            restored: false,
        })
    }
}

/// Guard returned by [`LoggerRegistry::install_progress`].
///
/// Restoring removes the progress sink and brings back the parked console
/// sink. Restoring twice, or dropping after an explicit restore, is a no-op.
pub struct ProgressSwap {
    core: Arc<LoggerCore>,
    restored: bool,
}

impl ProgressSwap {
    /// Remove the progress sink and reattach the console sink.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;

        let progress = {
            let mut sinks = self.core.sinks.write().unwrap_or_else(|e| e.into_inner());
            if let Some(console) = sinks.parked_console.take() {
                sinks.console.get_or_insert(console);
            }
            sinks.progress.take()
        };

        if let Some(progress) = progress {
            progress.close();
        }
    }
}

impl Drop for ProgressSwap {
    fn drop(&mut self) {
        self.restore();
    }
}
