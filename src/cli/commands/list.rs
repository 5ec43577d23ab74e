//! List command implementation.
//!
//! `kickstartds --list` prints every module and command of the task file.

use crate::error::Result;
use crate::tasks::TaskFile;
use crate::ui::{Prompter, Theme};

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand<'a> {
    tasks: &'a TaskFile,
}

impl<'a> ListCommand<'a> {
    pub fn new(tasks: &'a TaskFile) -> Self {
        Self { tasks }
    }

    /// One line per task: `module command` plus the description, if any.
    pub fn lines(&self, theme: &Theme) -> Vec<String> {
        let tasks = self.tasks.list();
        let width = tasks
            .iter()
            .map(|(module, command, _)| module.len() + command.len() + 1)
            .max()
            .unwrap_or(0);

        tasks
            .into_iter()
            .map(|(module, command, description)| {
                let name = format!("{} {}", module, command);
                match description {
                    Some(description) => format!(
                        "  {}  {}",
                        theme.highlight.apply_to(format!("{:<width$}", name, width = width)),
                        theme.dim.apply_to(description)
                    ),
                    None => format!("  {}", theme.highlight.apply_to(&name)),
                }
            })
            .collect()
    }
}

impl Command for ListCommand<'_> {
    fn execute(&self, _prompter: &mut dyn Prompter) -> Result<CommandResult> {
        let lines = self.lines(&Theme::detect());
        if lines.is_empty() {
            println!("No tasks defined.");
        }
        for line in lines {
            println!("{}", line);
        }
        Ok(CommandResult::success())
    }
}
