//! Line formats for console and file sinks.

use crate::ui::Theme;

use super::LogRecord;

/// Product prefix used in labelled log lines.
pub const PRODUCT: &str = "kickstartDS";

/// Format a record for the terminal.
///
/// - utility-scoped: `[{level}] {message}`
/// - step-scoped: `[{step}/{numSteps}] [{command}: {subcommand}] {level}: {message}`
/// - command-scoped: `[kickstartDS: {label}/{command}] {level}: {message}`
/// - otherwise: `[kickstartDS: {label}] {level}: {message}`
pub fn format_console(record: &LogRecord, theme: &Theme) -> String {
    let level = theme.level(record.level).apply_to(record.level.as_str());
    let meta = &record.meta;

    if meta.utility {
        return format!("[{}] {}", level, record.message);
    }

    match (&meta.command, &meta.subcommand) {
        (Some(command), Some(subcommand)) => {
            let counter = match (meta.step, meta.num_steps) {
                (Some(step), Some(total)) => format!("[{}/{}] ", step, total),
                _ => String::new(),
            };
            format!(
                "{}[{}: {}] {}: {}",
                theme.dim.apply_to(counter),
                command,
                theme.highlight.apply_to(subcommand),
                level,
                record.message
            )
        }
        (Some(command), None) => format!(
            "[{}: {}/{}] {}: {}",
            PRODUCT, record.label, command, level, record.message
        ),
        _ => format!(
            "[{}: {}] {}: {}",
            PRODUCT, record.label, level, record.message
        ),
    }
}

/// Format a record for a log file.
///
/// `{timestamp} [kickstartDS: {label}/{command}[: {subcommand}]] {level}: {message}`
pub fn format_file(record: &LogRecord) -> String {
    let meta = &record.meta;
    let scope = match (&meta.command, &meta.subcommand) {
        (Some(command), Some(subcommand)) => {
            format!("{}/{}: {}", record.label, command, subcommand)
        }
        (Some(command), None) => format!("{}/{}", record.label, command),
        _ => record.label.clone(),
    };
    format!(
        "{} [{}: {}] {}: {}",
        record.timestamp.to_rfc3339(),
        PRODUCT,
        scope,
        record.level,
        record.message
    )
}
