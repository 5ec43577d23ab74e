//! Log file sink and rotated file naming.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

use super::{format_file, LogRecord, LogSink, SinkKind};

/// Base name shared by all log files of a logger: `.{label}[-{command}]rc`.
pub fn log_base_name(label: &str, command: Option<&str>) -> String {
    match command {
        Some(command) => format!(".{}-{}rc", label, command),
        None => format!(".{}rc", label),
    }
}

/// Pick the log file path for a new file sink.
///
/// The first log is `{base}.log`. Once logs with that base exist, the next
/// one is `{base}.{N}.log` where `N` is the number of existing logs.
pub fn next_log_path(dir: &Path, label: &str, command: Option<&str>) -> PathBuf {
    let base = log_base_name(label, command);
    let existing = count_existing_logs(dir, &base);
    if existing == 0 {
        dir.join(format!("{}.log", base))
    } else {
        dir.join(format!("{}.{}.log", base, existing))
    }
}

fn count_existing_logs(dir: &Path, base: &str) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| is_log_for_base(name, base))
        .count()
}

fn is_log_for_base(name: &str, base: &str) -> bool {
    let Some(rest) = name.strip_prefix(base) else {
        return false;
    };
    if rest == ".log" {
        return true;
    }
    rest.strip_prefix('.')
        .and_then(|r| r.strip_suffix(".log"))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

/// Appends file-formatted records to a log file.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the log file at `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn log(&self, record: &LogRecord) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{}", format_file(record)).ok();
    }

    fn close(&self) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.flush().ok();
    }
}
