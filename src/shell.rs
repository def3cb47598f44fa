//! # External Command Execution
//!
//! Every external program the pipeline touches (the build tool, `git`, the
//! asset publisher) runs through the `CommandRunner` trait. The default
//! implementation, `ShellRunner`, spawns a child process with
//! `std::process::Command`; tests substitute a scripted runner so no real
//! process is ever started.
//!
//! A run never fails just because the program exited non-zero or could not
//! be spawned: both are reported as a `CommandResult` with
//! `succeeded == false`, and callers decide whether that matters. The only
//! exception is `must_succeed`, which turns a failed run into
//! `Error::CommandFailed`.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Capture stdout/stderr as text instead of inheriting the terminal.
    pub capture: bool,
}

impl ShellCommand {
    /// Create a command with no arguments that captures its output.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture: true,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Stream output straight to the terminal (long-running build steps).
    pub fn inherit_output(mut self) -> Self {
        self.capture = false;
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Uniform result of an external process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub succeeded: bool,
    pub output: String,
    pub error_text: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
            error_text: String::new(),
        }
    }

    pub fn failure(error_text: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: String::new(),
            error_text: error_text.into(),
        }
    }

    /// The most useful diagnostic text: stderr if present, else stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.error_text.trim();
        if stderr.is_empty() {
            self.output.trim()
        } else {
            stderr
        }
    }
}

/// Trait for running external commands - allows scripting in tests
pub trait CommandRunner {
    /// Runs `command` in `working_dir`.
    ///
    /// With `must_succeed == false` a failed run is returned as
    /// `Ok(CommandResult { succeeded: false, .. })`. With `must_succeed ==
    /// true` it becomes `Err(Error::CommandFailed)`.
    fn run(
        &self,
        command: &ShellCommand,
        working_dir: &Path,
        must_succeed: bool,
    ) -> Result<CommandResult>;
}

/// The default `CommandRunner`, which spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    fn spawn(command: &ShellCommand, working_dir: &Path) -> CommandResult {
        let mut process = Command::new(&command.program);
        process.args(&command.args).current_dir(working_dir);

        if command.capture {
            match process.output() {
                Ok(output) => CommandResult {
                    succeeded: output.status.success(),
                    output: String::from_utf8_lossy(&output.stdout).into_owned(),
                    error_text: String::from_utf8_lossy(&output.stderr).into_owned(),
                },
                Err(e) => CommandResult::failure(format!("{}: {}", command.program, e)),
            }
        } else {
            process
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            match process.status() {
                Ok(status) if status.success() => CommandResult::success(""),
                Ok(status) => CommandResult::failure(format!("{} exited with {}", command, status)),
                Err(e) => CommandResult::failure(format!("{}: {}", command.program, e)),
            }
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(
        &self,
        command: &ShellCommand,
        working_dir: &Path,
        must_succeed: bool,
    ) -> Result<CommandResult> {
        debug!("running `{}` in {}", command, working_dir.display());
        let result = Self::spawn(command, working_dir);

        if !result.succeeded {
            debug!("`{}` failed: {}", command, result.diagnostic());
            if must_succeed {
                return Err(Error::CommandFailed {
                    command: command.to_string(),
                    stderr: result.diagnostic().to_string(),
                });
            }
        }

        Ok(result)
    }
}

/// A `CommandRunner` that answers from a script and records every call.
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::cell::RefCell;

    /// Responses are matched by prefix against the rendered command line
    /// (`"git push origin main"`); the first matching rule wins. Unmatched
    /// commands succeed with empty output.
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        rules: Vec<(String, CommandResult)>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn on(mut self, prefix: &str, result: CommandResult) -> Self {
            self.rules.push((prefix.to_string(), result));
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub(crate) fn called(&self, prefix: &str) -> bool {
            self.calls.borrow().iter().any(|c| c.starts_with(prefix))
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(
            &self,
            command: &ShellCommand,
            _working_dir: &Path,
            must_succeed: bool,
        ) -> Result<CommandResult> {
            let line = command.to_string();
            self.calls.borrow_mut().push(line.clone());

            let result = self
                .rules
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, result)| result.clone())
                .unwrap_or_else(|| CommandResult::success(""));

            if must_succeed && !result.succeeded {
                return Err(Error::CommandFailed {
                    command: line,
                    stderr: result.diagnostic().to_string(),
                });
            }
            Ok(result)
        }
    }
}
