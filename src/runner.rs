//! External command execution.
//!
//! Every tool invocation goes through a [`CommandRunner`]. The process
//! implementation appends tool output to one shared log file, enforces the
//! configured deadline and reports success as a plain boolean through
//! [`CommandRunner::execute`], leaving diagnostics in the log.

use crate::output;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// How often a running child is polled while a deadline is armed
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One external invocation: program, arguments and optional stdin file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    /// Whether `flag` appears among the arguments
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        if let Some(stdin) = &self.stdin {
            write!(f, " < {}", stdin.display())?;
        }
        Ok(())
    }
}

/// Why an invocation did not succeed
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {}", describe_code(.code))]
    Failed { command: String, code: Option<i32> },

    #[error("{command} did not finish within {after:?} and was killed")]
    Timeout { command: String, after: Duration },

    #[error("cannot open stdin file {path}: {source}")]
    Stdin {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("log file error: {0}")]
    Log(#[from] io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Executes external tools against a shared log sink
pub trait CommandRunner {
    /// Run to completion with stdout and stderr appended to the log
    fn run(&mut self, command: &ToolCommand) -> Result<(), RunError>;

    /// Run to completion and return stdout as text; stderr goes to the log
    fn capture(&mut self, command: &ToolCommand) -> Result<String, RunError>;

    /// Path of the log sink, for user-facing messages
    fn log_path(&self) -> &Path;

    /// Run once and report success as a boolean.
    ///
    /// On failure the offending command and the log path are printed; the
    /// details stay in the log.
    fn execute(&mut self, command: &ToolCommand) -> bool {
        match self.run(command) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "command failed");
                output::print_command_failure(&command.to_string(), self.log_path(), &e);
                false
            }
        }
    }
}

/// [`CommandRunner`] backed by `std::process`
pub struct ProcessRunner {
    log: File,
    log_path: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Open (or create) the log in append mode
    pub fn open(log_path: &Path, timeout: Option<Duration>) -> io::Result<Self> {
        let log = OpenOptions::new().create(true).append(true).open(log_path)?;
        Ok(Self {
            log,
            log_path: log_path.to_path_buf(),
            timeout,
        })
    }

    fn prepare(&mut self, command: &ToolCommand) -> Result<Command, RunError> {
        writeln!(self.log, "# {}", command)?;
        self.log.flush()?;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd.stderr(Stdio::from(self.log.try_clone()?));

        match &command.stdin {
            Some(path) => {
                let file = File::open(path).map_err(|source| RunError::Stdin {
                    path: path.clone(),
                    source,
                })?;
                cmd.stdin(Stdio::from(file));
            }
            None => {
                cmd.stdin(Stdio::null());
            }
        }

        Ok(cmd)
    }

    fn spawn(cmd: &mut Command, command: &ToolCommand) -> Result<Child, RunError> {
        debug!(%command, "spawning");
        cmd.spawn().map_err(|source| RunError::Spawn {
            program: command.program.display().to_string(),
            source,
        })
    }

    /// Wait for the child, killing it once the deadline passes
    fn wait(&self, child: &mut Child, command: &ToolCommand) -> Result<ExitStatus, RunError> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(%command, timeout_secs = limit.as_secs(), "deadline reached, killing tool");
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::Timeout {
                    command: command.to_string(),
                    after: limit,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn check(status: ExitStatus, command: &ToolCommand) -> Result<(), RunError> {
        if status.success() {
            Ok(())
        } else {
            Err(RunError::Failed {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), RunError> {
        let mut cmd = self.prepare(command)?;
        cmd.stdout(Stdio::from(self.log.try_clone()?));

        let mut child = Self::spawn(&mut cmd, command)?;
        let status = self.wait(&mut child, command)?;
        Self::check(status, command)
    }

    fn capture(&mut self, command: &ToolCommand) -> Result<String, RunError> {
        let mut cmd = self.prepare(command)?;
        cmd.stdout(Stdio::piped());

        let mut child = Self::spawn(&mut cmd, command)?;

        // Drain stdout concurrently so the tool never blocks on a full pipe
        let reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf).map(|_| buf)
            })
        });

        let status = self.wait(&mut child, command);

        let captured = match reader {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdout reader panicked")))?,
            None => Vec::new(),
        };

        self.log.write_all(&captured)?;
        self.log.flush()?;

        Self::check(status?, command)?;
        Ok(String::from_utf8_lossy(&captured).into_owned())
    }

    fn log_path(&self) -> &Path {
        &self.log_path
    }
}
