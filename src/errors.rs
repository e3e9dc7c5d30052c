//! Error kinds for discovery and orchestration.
//!
//! Every error here is fatal: the first one raised anywhere during discovery
//! or orchestration ends the run for the current and all remaining targets.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Convenience alias used across the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which half of the external step contract was being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Build,
    Clean,
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepAction::Build => write!(f, "build"),
            StepAction::Clean => write!(f, "clean"),
        }
    }
}

#[derive(Debug, Error, MietteDiagnostic)]
pub enum Error {
    /// Bad command line: unknown target name or conflicting mode flags.
    #[error("{message}")]
    #[diagnostic(code(mdmake::config))]
    Config { message: String },

    #[error("could not open {}", path.display())]
    #[diagnostic(code(mdmake::descriptor::not_found))]
    DescriptorNotFound { path: PathBuf },

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(mdmake::descriptor::read))]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// More `../` segments were requested than the tracked path can give up.
    #[error("cannot ascend {requested} level(s) from `{path}` (at most {depth} allowed)")]
    #[diagnostic(code(mdmake::path::ascension))]
    PathAscension {
        path: String,
        requested: usize,
        depth: usize,
    },

    #[error("failed to start `{program}`")]
    #[diagnostic(code(mdmake::step::spawn))]
    StepSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{action} step failed for `{project}`{}", exit_suffix(*code))]
    #[diagnostic(code(mdmake::step::failed))]
    ExternalStepFailure {
        action: StepAction,
        project: String,
        code: Option<i32>,
    },

    #[error("dependency cycle detected")]
    #[diagnostic(
        code(mdmake::graph::cycle),
        help("Remove one of the DEPENDENCIES entries that closes the cycle")
    )]
    DependencyCycle { projects: Vec<String> },
}

fn exit_suffix(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {})", code),
        None => " (terminated by signal)".to_string(),
    }
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Config { message } => {
                Diagnostic::error(message.clone()).with_suggestion(suggestions::VALID_TARGETS)
            }

            Error::DescriptorNotFound { path } => Diagnostic::error(format!(
                "could not open {}",
                path.display()
            ))
            .with_context("every directory listed in DEPENDENCIES must contain a descriptor")
            .with_suggestion(suggestions::CHECK_DEPENDENCIES),

            Error::DescriptorRead { path, source } => {
                Diagnostic::error(format!("failed to read {}", path.display()))
                    .with_context(source.to_string())
            }

            Error::PathAscension {
                path,
                requested,
                depth,
            } => Diagnostic::error(format!("cannot go up {} directories", requested))
                .with_context(format!("`{}` only allows {}", path, depth))
                .with_suggestion(suggestions::CHECK_DEPENDENCIES),

            Error::StepSpawn { program, source } => {
                Diagnostic::error(format!("failed to start `{}`", program))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::MAKE_PROGRAM)
            }

            Error::ExternalStepFailure {
                action,
                project,
                code,
            } => Diagnostic::error(format!("{} step failed", action))
                .with_location(project)
                .with_context(exit_suffix(*code).trim().to_string())
                .with_suggestion(suggestions::EXTRAINFO),

            Error::DependencyCycle { projects } => {
                Diagnostic::error("dependency cycle detected")
                    .with_context(format!("cycle: {}", projects.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by removing one of the DEPENDENCIES entries".to_string(),
                    )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failure_message() {
        let err = Error::ExternalStepFailure {
            action: StepAction::Clean,
            project: "/work/lib/".to_string(),
            code: Some(2),
        };

        assert_eq!(
            err.to_string(),
            "clean step failed for `/work/lib/` (exit code 2)"
        );
    }

    #[test]
    fn test_cycle_diagnostic() {
        let err = Error::DependencyCycle {
            projects: vec!["/a/".to_string(), "/b/".to_string(), "/a/".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("dependency cycle detected"));
        assert!(output.contains("/a/ -> /b/ -> /a/"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_ascension_diagnostic() {
        let err = Error::PathAscension {
            path: "/work/".to_string(),
            requested: 3,
            depth: 1,
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("cannot go up 3 directories"));
        assert!(output.contains("`/work/` only allows 1"));
    }
}
