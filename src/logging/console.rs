//! Terminal sink.

use std::io::Write;

use console::Term;

use crate::ui::Theme;

use super::{format_console, LogLevel, LogRecord, LogSink, SinkKind};

/// Writes formatted records to the terminal.
///
/// `error` and `warn` go to stderr, everything else to stdout.
pub struct ConsoleSink {
    stdout: Term,
    stderr: Term,
    theme: Theme,
}

impl ConsoleSink {
    /// Create a console sink with colour detection.
    pub fn new() -> Self {
        Self::with_theme(Theme::detect())
    }

    /// Create a console sink with an explicit theme.
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
            theme,
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn log(&self, record: &LogRecord) {
        let line = format_console(record, &self.theme);
        let mut term = match record.level {
            LogLevel::Error | LogLevel::Warn => &self.stderr,
            _ => &self.stdout,
        };
        writeln!(term, "{}", line).ok();
    }
}
