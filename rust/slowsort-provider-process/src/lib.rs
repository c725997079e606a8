//! Subprocess provider for the external doubling operation.
//!
//! [`CommandDoubler`] runs a helper program once per value, passing the value
//! as the final command-line argument:
//!
//! ```text
//! ./calc.sh 21      # stdout: "42"
//! ```
//!
//! The call succeeds only when the helper exits with status 0 and its
//! standard output, trimmed, parses as an `i64`. Anything else becomes a
//! [`ProcessError`], which the transformer records against the element.
//!
//! The command line is split with `shell-words`, so quoting works the way
//! it does in a shell: `sh -c 'echo $(( $0 * 2 ))'` is a valid command.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use slowsort_rt::transform::Doubler;
use slowsort_rt::DoubleFailure;
use thiserror::Error;

/// Helper invoked when no command is configured.
pub const DEFAULT_COMMAND: &str = "./calc.sh";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("command line is empty")]
    EmptyCommand,
    #[error("cannot parse command line '{command}': {source}")]
    InvalidCommand {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },
    #[error("cannot run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("'{program}' exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("'{program}' printed '{stdout}', which is not an integer")]
    InvalidOutput { program: String, stdout: String },
}

// ---------------------------------------------------------------------------
// CommandDoubler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDoubler {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandDoubler {
    /// Parse `command` into a program and leading arguments.
    pub fn new(command: &str) -> Result<Self, ProcessError> {
        let mut words =
            shell_words::split(command).map_err(|source| ProcessError::InvalidCommand {
                command: command.to_string(),
                source,
            })?;
        if words.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
            current_dir: None,
        })
    }

    /// Run the helper from `dir` instead of the process working directory.
    ///
    /// Relative program paths such as `./calc.sh` resolve against it; pass
    /// an absolute directory to keep that resolution unambiguous.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Run the helper for one value.
    pub fn run(&self, value: i64) -> Result<i64, ProcessError> {
        let output = self.command(value).output().map_err(|source| ProcessError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        self.parse_output(output)
    }

    fn command(&self, value: i64) -> Command {
        let mut cmd = Command::new(self.resolved_program());
        cmd.args(&self.args)
            .arg(value.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    // A relative program path with a separator is ambiguous once a working
    // directory is set on the child, so anchor it to that directory here.
    fn resolved_program(&self) -> PathBuf {
        let program = Path::new(&self.program);
        match &self.current_dir {
            Some(dir) if program.is_relative() && program.components().count() > 1 => {
                dir.join(program)
            }
            _ => program.to_path_buf(),
        }
    }

    fn parse_output(&self, output: Output) -> Result<i64, ProcessError> {
        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("status {}", code),
                None => "a signal".to_string(),
            };
            return Err(ProcessError::NonZeroExit {
                program: self.program.clone(),
                status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        stdout.parse::<i64>().map_err(|_| ProcessError::InvalidOutput {
            program: self.program.clone(),
            stdout,
        })
    }
}

impl Default for CommandDoubler {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMMAND.to_string(),
            args: Vec::new(),
            current_dir: None,
        }
    }
}

impl Doubler for CommandDoubler {
    fn double(&self, value: i64) -> Result<i64, DoubleFailure> {
        self.run(value).map_err(|e| {
            tracing::debug!(program = %self.program, value, error = %e, "helper call failed");
            DoubleFailure::new(e.to_string())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
