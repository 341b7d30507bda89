//! Blocking execution of package-manager commands.
//!
//! The [`CommandRunner`] trait is the seam between the version oracle and
//! the operating system; tests substitute a runner that returns canned
//! listings.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, UtilitiesError};

/// Interval between exit checks while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
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

impl CommandOutput {
    /// Create a success result.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
            duration: Duration::ZERO,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
            success: false,
        }
    }
}

/// Runs a program to completion and captures its output.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// A non-zero exit is reported through [`CommandOutput::success`], not
    /// as an error. Errors are reserved for failing to run the program.
    fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput>;
}

/// Runs commands as real subprocesses.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// A runner that waits as long as the command takes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the command if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Render a command line for logs and errors.
pub fn display_command(program: &Path, args: &[String]) -> String {
    let mut command = program.display().to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
        let start = Instant::now();
        let command = display_command(program, args);
        tracing::debug!("Running {}", command);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| UtilitiesError::ToolInvocationFailed {
                command: command.clone(),
                code: None,
                stderr: e.to_string(),
            })?;

        // Pipes are drained off-thread while the child runs.
        let stdout_handle = spawn_reader(child.stdout.take());
        let stderr_handle = spawn_reader(child.stderr.take());

        let invocation_failed = |e: std::io::Error| UtilitiesError::ToolInvocationFailed {
            command: command.clone(),
            code: None,
            stderr: e.to_string(),
        };
        let status = match self.timeout {
            None => child.wait().map_err(invocation_failed)?,
            Some(timeout) => match wait_with_deadline(&mut child, start + timeout)
                .map_err(invocation_failed)?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(UtilitiesError::ToolInvocationFailed {
                        command,
                        code: None,
                        stderr: format!("timed out after {}s", timeout.as_secs_f64()),
                    });
                }
            },
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            duration: start.elapsed(),
            success: status.success(),
        })
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> thread::JoinHandle<String>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
