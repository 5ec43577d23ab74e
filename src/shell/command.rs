//! Shell command execution.

use crate::error::{KickstartError, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory; the process cwd when unset.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables, merged over the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Output line from command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

fn shell_command(command: &str, options: &CommandOptions) -> Command {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd.exe");
        cmd.arg("/C");
        cmd
    } else {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c");
        cmd
    };
    cmd.arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }
    cmd
}

fn spawn_failed(command: &str) -> KickstartError {
    KickstartError::CommandFailed {
        command: command.to_string(),
        code: None,
    }
}

/// Execute a shell command, capturing its output.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let output = shell_command(command, options)
        .stdin(Stdio::null())
        .output()
        .map_err(|_| spawn_failed(command))?;

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration: start.elapsed(),
        success: output.status.success(),
    })
}

fn forward_lines<R, F>(reader: R, tx: mpsc::Sender<OutputLine>, wrap: F) -> thread::JoinHandle<String>
where
    R: Read + Send + 'static,
    F: Fn(String) -> OutputLine + Send + 'static,
{
    thread::spawn(move || {
        let mut collected = String::new();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            collected.push_str(&line);
            collected.push('\n');
            let _ = tx.send(wrap(line));
        }
        collected
    })
}

/// Execute a shell command, handing each output line to `on_line` as it arrives.
///
/// Lines are delivered on the calling thread.
pub fn execute_streaming<F>(
    command: &str,
    options: &CommandOptions,
    mut on_line: F,
) -> Result<CommandResult>
where
    F: FnMut(OutputLine),
{
    let start = Instant::now();

    let mut child = shell_command(command, options)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|_| spawn_failed(command))?;

    let stdout = child.stdout.take().ok_or_else(|| spawn_failed(command))?;
    let stderr = child.stderr.take().ok_or_else(|| spawn_failed(command))?;

    let (tx, rx) = mpsc::channel();
    let stdout_handle = forward_lines(stdout, tx.clone(), OutputLine::Stdout);
    let stderr_handle = forward_lines(stderr, tx, OutputLine::Stderr);

    for line in rx {
        on_line(line);
    }

    let stdout_output = stdout_handle.join().unwrap_or_default();
    let stderr_output = stderr_handle.join().unwrap_or_default();

    let status = child.wait().map_err(|_| spawn_failed(command))?;

    Ok(CommandResult {
        exit_code: status.code(),
        stdout: stdout_output,
        stderr: stderr_output,
        duration: start.elapsed(),
        success: status.success(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &CommandOptions::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &CommandOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_with_env() {
        let options = CommandOptions {
            env: vec![("KS_BRANCH".to_string(), "main".to_string())],
            ..Default::default()
        };

        let result = execute("echo $KS_BRANCH", &options).unwrap();

        assert_eq!(result.stdout.trim(), "main");
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };

        let result = execute("pwd", &options).unwrap();

        let expected = temp.path().canonicalize().unwrap();
        let actual = PathBuf::from(result.stdout.trim()).canonicalize().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn streaming_delivers_both_streams() {
        let mut lines = Vec::new();
        let result = execute_streaming(
            "echo line1 && echo oops >&2 && echo line2",
            &CommandOptions::default(),
            |line| lines.push(line),
        )
        .unwrap();

        assert!(result.success);
        assert!(lines.contains(&OutputLine::Stdout("line1".to_string())));
        assert!(lines.contains(&OutputLine::Stdout("line2".to_string())));
        assert!(lines.contains(&OutputLine::Stderr("oops".to_string())));
        assert_eq!(result.stdout, "line1\nline2\n");
    }

    #[test]
    fn streaming_survives_invalid_utf8() {
        let mut lines = Vec::new();
        let result = execute_streaming(
            "printf 'caf\\351\\n'; echo after",
            &CommandOptions::default(),
            |line| lines.push(line),
        )
        .unwrap();

        assert!(result.success);
        assert_eq!(
            lines,
            vec![
                OutputLine::Stdout("caf\u{FFFD}".to_string()),
                OutputLine::Stdout("after".to_string()),
            ]
        );
        assert!(result.stdout.ends_with("after\n"));
    }

    #[test]
    fn streaming_reports_exit_code() {
        let result = execute_streaming("exit 2", &CommandOptions::default(), |_| {}).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(2));
    }
}
