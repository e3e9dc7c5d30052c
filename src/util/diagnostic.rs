//! User-friendly diagnostic messages.
//!
//! Every fatal error is rendered with its root cause, the context that led
//! to it and, where one exists, a suggested fix.

use std::fmt;
use std::path::PathBuf;

use crate::util::shell::{paint, Status};

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a target name is not recognized.
    pub const VALID_TARGETS: &str =
        "Use TARGETS=<debug|release|optdebug> (or any comma separated combination)";

    /// Suggestion when a dependency directory is wrong.
    pub const CHECK_DEPENDENCIES: &str =
        "Check the DEPENDENCIES paths, they are relative to the declaring project";

    /// Suggestion when the external program cannot be started.
    pub const MAKE_PROGRAM: &str =
        "Install make or point `--make` / `step.program` at the build program";

    /// Suggestion when the external step fails.
    pub const EXTRAINFO: &str = "Re-run with `extrainfo` to see the exact command";
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related project or file
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}: {}\n",
            paint("error", Status::Error, color),
            self.message
        ));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            output.push_str(&format!(
                "{}: consider:\n",
                paint("help", Status::Finished, color)
            ));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
