//! Named loggers with swappable sinks.
//!
//! A [`Logger`] is a cheap handle onto a shared logger core owned by a
//! [`LoggerRegistry`]. The core holds up to three sinks (console, file and
//! progress bar); reconfiguring them through the registry never changes the
//! core's identity, so child loggers handed to steps keep working.
//!
//! # Example
//!
//! ```
//! use kickstartds::logging::{LogLevel, LoggerRegistry};
//! use tempfile::TempDir;
//!
//! let dir = TempDir::new().unwrap();
//! let registry = LoggerRegistry::new(dir.path());
//! let logger = registry
//!     .get_logger("schema", LogLevel::Info, false, true, None)
//!     .unwrap();
//! logger.info("loaded 12 components");
//! assert!(dir.path().join(".schemarc.log").exists());
//! ```

pub mod console;
pub mod file;
pub mod format;
pub mod registry;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local};

pub use console::ConsoleSink;
pub use file::FileSink;
pub use format::{format_console, format_file};
pub use registry::{LoggerRegistry, ProgressSwap};

/// Log severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
}

impl LogLevel {
    /// Lower-case level name as printed in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

/// Context attached to every record a logger emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMeta {
    /// Command the record belongs to (e.g. `compile`).
    pub command: Option<String>,
    /// Step name within the command (e.g. `check-prerequisites`).
    pub subcommand: Option<String>,
    /// 1-based index of the step within its phase.
    pub step: Option<usize>,
    /// Number of steps in the phase.
    pub num_steps: Option<usize>,
    /// Utility-scoped records render without label or command.
    pub utility: bool,
}

impl LogMeta {
    /// Metadata for a step inside a phase.
    pub fn for_step(command: &str, subcommand: &str, step: usize, num_steps: usize) -> Self {
        Self {
            command: Some(command.to_string()),
            subcommand: Some(subcommand.to_string()),
            step: Some(step),
            num_steps: Some(num_steps),
            utility: false,
        }
    }

    /// Overlay `other` onto `self`; set fields in `other` win.
    fn merged(&self, other: &LogMeta) -> LogMeta {
        LogMeta {
            command: other.command.clone().or_else(|| self.command.clone()),
            subcommand: other.subcommand.clone().or_else(|| self.subcommand.clone()),
            step: other.step.or(self.step),
            num_steps: other.num_steps.or(self.num_steps),
            utility: self.utility || other.utility,
        }
    }
}

/// A single log event as delivered to sinks.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub label: String,
    pub level: LogLevel,
    pub message: String,
    pub meta: LogMeta,
}

/// Which slot of a logger a sink occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File,
    Progress,
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    /// Slot this sink occupies.
    fn kind(&self) -> SinkKind;

    /// Write one record.
    fn log(&self, record: &LogRecord);

    /// A step of the current phase is starting; delivered regardless of level.
    fn step_started(&self, _meta: &LogMeta) {}

    /// A step of the current phase finished.
    fn step_complete(&self) {}

    /// Release resources; called when the sink is removed.
    fn close(&self) {}
}

#[derive(Default)]
pub(crate) struct Sinks {
    pub(crate) console: Option<Arc<dyn LogSink>>,
    pub(crate) file: Option<Arc<dyn LogSink>>,
    pub(crate) progress: Option<Arc<dyn LogSink>>,
    /// Console sink parked while a progress sink is installed.
    pub(crate) parked_console: Option<Arc<dyn LogSink>>,
}

impl Sinks {
    fn active(&self) -> Vec<Arc<dyn LogSink>> {
        [&self.console, &self.file, &self.progress]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

pub(crate) struct LoggerCore {
    pub(crate) label: String,
    pub(crate) level: RwLock<LogLevel>,
    pub(crate) sinks: RwLock<Sinks>,
}

/// Number of sinks attached to a logger, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCounts {
    pub console: usize,
    pub file: usize,
    pub progress: usize,
}

/// Handle for emitting records through a named logger.
#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
    meta: LogMeta,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("label", &self.core.label)
            .field("meta", &self.meta)
            .finish()
    }
}

impl Logger {
    pub(crate) fn from_core(core: Arc<LoggerCore>, meta: LogMeta) -> Self {
        Self { core, meta }
    }

    /// Label this logger was registered under.
    pub fn label(&self) -> &str {
        &self.core.label
    }

    /// Metadata attached to every record.
    pub fn meta(&self) -> &LogMeta {
        &self.meta
    }

    /// Derive a logger sharing the same sinks with extra metadata.
    pub fn child(&self, meta: LogMeta) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            meta: self.meta.merged(&meta),
        }
    }

    /// Derive a utility-scoped logger (`[{level}] {message}`).
    pub fn utility(&self) -> Logger {
        self.child(LogMeta {
            utility: true,
            ..Default::default()
        })
    }

    /// Whether two handles point at the same logger core.
    pub fn same_logger(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Current level threshold.
    pub fn level(&self) -> LogLevel {
        *self.core.level.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether records at `level` pass the threshold.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level()
    }

    /// Emit a record at `level`.
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let record = LogRecord {
            timestamp: Local::now(),
            label: self.core.label.clone(),
            level,
            message: message.to_string(),
            meta: self.meta.clone(),
        };
        for sink in self.active_sinks() {
            sink.log(&record);
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Signal sinks that the step described by this logger's meta is starting.
    pub fn step_started(&self) {
        for sink in self.active_sinks() {
            sink.step_started(&self.meta);
        }
    }

    /// Signal sinks that the current step finished.
    pub fn step_complete(&self) {
        for sink in self.active_sinks() {
            sink.step_complete();
        }
    }

    /// Count attached sinks by kind.
    pub fn sink_counts(&self) -> SinkCounts {
        let sinks = self.core.sinks.read().unwrap_or_else(|e| e.into_inner());
        SinkCounts {
            console: usize::from(sinks.console.is_some()),
            file: usize::from(sinks.file.is_some()),
            progress: usize::from(sinks.progress.is_some()),
        }
    }

    fn active_sinks(&self) -> Vec<Arc<dyn LogSink>> {
        // Snapshot so sinks can be swapped while a record is being written.
        self.core
            .sinks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .active()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::{LogMeta, LogRecord, LogSink, SinkKind};

    /// Sink that keeps every record in memory.
    pub struct MemorySink {
        kind: SinkKind,
        pub records: Mutex<Vec<LogRecord>>,
        pub starts: Mutex<Vec<LogMeta>>,
        pub completions: Mutex<usize>,
    }

    impl MemorySink {
        pub fn new(kind: SinkKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                records: Mutex::new(Vec::new()),
                starts: Mutex::new(Vec::new()),
                completions: Mutex::new(0),
            })
        }

        pub fn messages(&self) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.message.clone())
                .collect()
        }
    }

    impl LogSink for MemorySink {
        fn kind(&self) -> SinkKind {
            self.kind
        }

        fn log(&self, record: &LogRecord) {
            self.records.lock().unwrap().push(record.clone());
        }

        fn step_started(&self, meta: &LogMeta) {
            self.starts.lock().unwrap().push(meta.clone());
        }

        fn step_complete(&self) {
            *self.completions.lock().unwrap() += 1;
        }
    }
}
