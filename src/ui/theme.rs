//! Visual theme and styling.

use console::Style;

use crate::logging::LogLevel;

/// Terminal styles used for log lines and status output.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for `error` level names and fatal messages (red bold).
    pub error: Style,
    /// Style for `warn` level names (orange).
    pub warn: Style,
    /// Style for `info` level names (magenta).
    pub info: Style,
    /// Style for `verbose` and `debug` level names (dim).
    pub dim: Style,
    /// Style for success messages (green).
    pub success: Style,
    /// Style for labels and step names (bold).
    pub highlight: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    /// Create the default coloured theme.
    pub fn new() -> Self {
        Self {
            error: Style::new().red().bold(),
            warn: Style::new().color256(208),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            success: Style::new().green(),
            highlight: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or `NO_COLOR`).
    pub fn plain() -> Self {
        Self {
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            success: Style::new(),
            highlight: Style::new(),
        }
    }

    /// Pick a theme based on [`should_use_colors`].
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Style for a log level name.
    pub fn level(&self, level: LogLevel) -> &Style {
        match level {
            LogLevel::Error => &self.error,
            LogLevel::Warn => &self.warn,
            LogLevel::Info => &self.info,
            LogLevel::Verbose | LogLevel::Debug => &self.dim,
        }
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
