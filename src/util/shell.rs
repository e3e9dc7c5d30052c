//! Status output for the orchestrator.
//!
//! All user-facing lines go to stderr so they interleave correctly with the
//! output of the external build step, which inherits the terminal.
//!
//! Coloring is a pure function of the text and its semantic [`Status`]; see
//! [`paint`].

use std::fmt::Display;
use std::io::{self, IsTerminal};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    #[default]
    Normal,
    /// Also echo every external command line
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
    Never,
}

/// Semantic status of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // In-progress (cyan)
    Building,
    Cleaning,
    Discovering,

    // Success (green)
    Finished,

    // Echo (blue)
    Command,

    // Warning (yellow)
    Warning,

    // Error (red)
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Building => "Building",
            Status::Cleaning => "Cleaning",
            Status::Discovering => "Discovering",
            Status::Finished => "Finished",
            Status::Command => "Running",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Building | Status::Cleaning | Status::Discovering => "\x1b[1;36m",
            Status::Finished => "\x1b[1;32m",
            Status::Command => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Wrap `text` in the ANSI color of `status` when `color` is set.
pub fn paint(text: &str, status: Status, color: bool) -> String {
    if color {
        format!("{}{}\x1b[0m", status.color_code(), text)
    } else {
        text.to_string()
    }
}

/// Central shell for all CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
        }
    }

    /// A shell that prints nothing but errors, for tests and embedding.
    pub fn quiet() -> Self {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`. In quiet mode only errors are printed.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Echo an external command line (verbose mode only).
    pub fn command(&self, line: impl Display) {
        if self.is_verbose() {
            self.status(Status::Command, line);
        }
    }

    fn format_status(&self, status: Status) -> String {
        paint(&format!("{:>12}", status.as_str()), status, self.use_color)
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}
