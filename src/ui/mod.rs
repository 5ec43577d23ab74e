//! Interactive user interface components.
//!
//! This module provides:
//! - [`Prompter`] trait for prompt abstraction
//! - [`TerminalPrompter`] for interactive terminal usage
//! - [`MockPrompter`] for tests
//! - Theme and duration formatting shared by the log sinks and progress bar

pub mod mock;
pub mod progress;
pub mod prompts;
pub mod theme;

pub use mock::MockPrompter;
pub use progress::format_duration;
pub use prompts::{prompt_user, TerminalPrompter};
pub use theme::{should_use_colors, Theme};

use crate::error::Result;

/// Trait for asking the user questions.
///
/// This trait allows mocking prompts in tests.
pub trait Prompter {
    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Dotted property path the answer is stored under (e.g. `cms.schemaPath`).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// The type of prompt.
    pub prompt_type: PromptType,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

/// The type of prompt.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Yes/no confirmation.
    Confirm,
    /// Free-form text input.
    Input,
    /// Select one from a list of options.
    Select { options: Vec<PromptOption> },
    /// Select multiple from a list of options.
    MultiSelect { options: Vec<PromptOption> },
}

impl PromptType {
    /// Interpret a raw answer (a response or a default) for this prompt type.
    ///
    /// Confirm accepts `true`, `y` and `yes`; multi-select splits on commas.
    pub fn parse_answer(&self, raw: &str) -> PromptResult {
        match self {
            PromptType::Confirm => {
                PromptResult::Bool(matches!(raw.trim(), "true" | "y" | "yes"))
            }
            PromptType::Input | PromptType::Select { .. } => PromptResult::String(raw.to_string()),
            PromptType::MultiSelect { .. } => PromptResult::Strings(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        }
    }
}

/// An option in a select prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// Display label.
    pub label: String,
    /// Value returned when selected.
    pub value: String,
}

/// Result of a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptResult {
    /// Boolean result from confirm.
    Bool(bool),
    /// String result from input or select.
    String(String),
    /// Multiple string results from multi-select.
    Strings(Vec<String>),
}

impl PromptResult {
    /// Get as string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
            Self::Strings(v) => v.join(","),
        }
    }

    /// Convert into a config value.
    pub fn into_value(self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::String(s) => serde_json::Value::String(s),
            Self::Strings(v) => {
                serde_json::Value::Array(v.into_iter().map(serde_json::Value::String).collect())
            }
        }
    }
}
