//! Shell command steps.

use std::path::Path;

use crate::error::Result;
use crate::logging::Logger;
use crate::shell::{echo_suppressed, execute_streaming, CommandOptions, OutputLine};

use super::Step;

/// Runs a command through the platform shell inside the workspace.
///
/// Stdout lines are logged at info, stderr lines at warn. A non-zero exit
/// is a declared failure (`Ok(false)`); a command that cannot be started
/// is an error.
#[derive(Debug, Clone)]
pub struct ShellStep {
    id: String,
    command: String,
    env: Vec<(String, String)>,
}

impl ShellStep {
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            env: Vec::new(),
        }
    }

    /// Add environment variables for the command.
    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }
}

impl Step for ShellStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, logger: &Logger, workspace: &Path) -> Result<bool> {
        if echo_suppressed() {
            logger.debug(&format!("$ {}", self.command));
        } else {
            logger.info(&format!("$ {}", self.command));
        }

        let options = CommandOptions {
            cwd: Some(workspace.to_path_buf()),
            env: self.env.clone(),
        };

        let result = execute_streaming(&self.command, &options, |line| match line {
            OutputLine::Stdout(text) => logger.info(&text),
            OutputLine::Stderr(text) => logger.warn(&text),
        })?;

        if !result.success {
            let code = result
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            logger.error(&format!("Command exited with {}: {}", code, self.command));
        }

        Ok(result.success)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::logging::testing::MemorySink;
    use crate::logging::{LogLevel, LogSink, LoggerRegistry, SinkKind};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn logger_with_sink(temp: &TempDir) -> (LoggerRegistry, Logger, Arc<MemorySink>) {
        let sink = MemorySink::new(SinkKind::Console);
        let factory_sink = Arc::clone(&sink);
        let registry = LoggerRegistry::new(temp.path())
            .with_console_factory(move || Arc::clone(&factory_sink) as Arc<dyn LogSink>);
        let logger = registry
            .get_logger("shell", LogLevel::Debug, true, false, None)
            .unwrap();
        (registry, logger, sink)
    }

    #[test]
    fn output_lines_reach_the_logger() {
        let temp = TempDir::new().unwrap();
        let (_registry, logger, sink) = logger_with_sink(&temp);

        let step = ShellStep::new("greet", "echo hello && echo careful >&2");
        assert!(step.run(&logger, temp.path()).unwrap());

        let messages = sink.messages();
        assert!(messages.contains(&"$ echo hello && echo careful >&2".to_string()));
        assert!(messages.contains(&"hello".to_string()));
        assert!(messages.contains(&"careful".to_string()));
    }

    #[test]
    fn runs_inside_the_workspace_with_env() {
        let temp = TempDir::new().unwrap();
        let (_registry, logger, _sink) = logger_with_sink(&temp);

        let step = ShellStep::new("write", "echo $KS_NAME > out.txt")
            .with_env(vec![("KS_NAME".into(), "tokens".into())]);
        assert!(step.run(&logger, temp.path()).unwrap());

        let written = std::fs::read_to_string(temp.path().join("out.txt")).unwrap();
        assert_eq!(written.trim(), "tokens");
    }

    #[test]
    fn non_zero_exit_is_a_declared_failure() {
        let temp = TempDir::new().unwrap();
        let (_registry, logger, sink) = logger_with_sink(&temp);

        let step = ShellStep::new("fail", "exit 4");
        assert!(!step.run(&logger, temp.path()).unwrap());
        assert!(sink
            .messages()
            .iter()
            .any(|m| m.starts_with("Command exited with 4")));
    }
}
