//! The external per-project build/clean step.
//!
//! The orchestrator never compiles anything itself. For every project it
//! hands a [`StepInvocation`] to an [`ExternalStep`], which in production is
//! `make` reading the project's descriptor with the shared build rules.

use std::path::PathBuf;

use crate::core::path::ProjectPath;
use crate::core::target::Target;
use crate::errors::{Error, Result, StepAction};
use crate::util::process::{find_executable, ProcessBuilder};

/// Everything the external step is told about one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInvocation {
    pub action: StepAction,
    pub project: ProjectPath,
    pub target: Target,
    /// Artifact file name, for status output
    pub name: String,
    /// Absolute artifact paths of the immediate dependencies (build only)
    pub dependencies: Vec<String>,
    pub link_source: String,
    pub link_destination: String,
}

impl StepInvocation {
    /// Dependency artifacts as one space separated token.
    pub fn dependency_list(&self) -> String {
        self.dependencies.join(" ")
    }
}

/// Runs the build or clean of a single project.
///
/// Implementations block until the step has finished and only report
/// success or failure; any output goes straight to the terminal.
pub trait ExternalStep {
    fn run(&mut self, invocation: &StepInvocation) -> Result<()>;

    /// The command line `run` would execute, for diagnostics.
    fn describe(&self, invocation: &StepInvocation) -> String;
}

/// `make --directory=<project> -f <descriptor> TARGET=... ...`
#[derive(Debug, Clone)]
pub struct MakeStep {
    program: PathBuf,
    descriptor: String,
    passthrough: Vec<String>,
}

impl MakeStep {
    pub fn new(program: impl Into<PathBuf>, descriptor: impl Into<String>) -> Self {
        MakeStep {
            program: program.into(),
            descriptor: descriptor.into(),
            passthrough: Vec::new(),
        }
    }

    /// Arguments appended verbatim to every invocation.
    pub fn with_passthrough(mut self, args: Vec<String>) -> Self {
        self.passthrough = args;
        self
    }

    /// Resolve a bare program name through `PATH` so a missing tool is
    /// reported before anything runs.
    pub fn resolve_program(mut self) -> Result<Self> {
        let name = self.program.to_string_lossy().into_owned();
        if self.program.components().count() > 1 {
            return Ok(self);
        }

        match find_executable(&name) {
            Some(path) => {
                self.program = path;
                Ok(self)
            }
            None => Err(Error::StepSpawn {
                program: name,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found in PATH"),
            }),
        }
    }

    pub fn command(&self, invocation: &StepInvocation) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .arg("--no-print-directory")
            .arg(format!("--directory={}", invocation.project))
            .args(["-f", self.descriptor.as_str()])
            .arg(format!("TARGET={}", invocation.target));

        if invocation.action == StepAction::Build {
            cmd = cmd.arg(format!("DEPENDENCIES={}", invocation.dependency_list()));
        }

        cmd = cmd
            .arg(format!("LINK_SRC={}", invocation.link_source))
            .arg(format!("LINK_DST={}", invocation.link_destination));

        if invocation.action == StepAction::Clean {
            cmd = cmd.arg("clean");
        }

        cmd.args(&self.passthrough)
    }
}

impl ExternalStep for MakeStep {
    fn run(&mut self, invocation: &StepInvocation) -> Result<()> {
        let cmd = self.command(invocation);
        let status = cmd.status().map_err(|source| Error::StepSpawn {
            program: self.program.display().to_string(),
            source,
        })?;

        if !status.success() {
            return Err(Error::ExternalStepFailure {
                action: invocation.action,
                project: invocation.project.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn describe(&self, invocation: &StepInvocation) -> String {
        self.command(invocation).display_command()
    }
}
