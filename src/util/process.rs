//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Builder for a blocking subprocess that shares the caller's terminal.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Run to completion with inherited stdio and return the exit status.
    pub fn status(&self) -> std::io::Result<ExitStatus> {
        tracing::debug!("running `{}`", self.display_command());
        Command::new(&self.program).args(&self.args).status()
    }

    /// Display the command for logs and error messages.
    ///
    /// Arguments containing whitespace are double-quoted, the way a shell
    /// user would have to type them.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|arg| quote_arg(arg)));
        parts.join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.chars().any(char::is_whitespace) {
        return arg.to_string();
    }

    match arg.split_once('=') {
        Some((key, value)) if !key.chars().any(char::is_whitespace) => {
            format!("{}=\"{}\"", key, value)
        }
        _ => format!("\"{}\"", arg),
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
