//! Test utilities for mdmake unit tests.
//!
//! [`ProjectTree`] lays out real descriptors in a temporary directory;
//! [`RecordingStep`] stands in for `make` and remembers what it was asked
//! to do.
//!
//! # Example
//!
//! ```rust,ignore
//! use mdmake::test_support::{ProjectTree, RecordingStep};
//!
//! let tree = ProjectTree::new()
//!     .with_project("app", "NAME := app\nOUT_DIR := out\nDEPENDENCIES := ../lib\n")
//!     .with_project("lib", "NAME := liblib.a\nOUT_DIR := out\n");
//! let mut graph = tree.discover("app", Target::Debug);
//! let mut step = RecordingStep::new();
//! ```

pub mod fixtures;

use crate::builder::step::{ExternalStep, StepInvocation};
use crate::core::path::ProjectPath;
use crate::errors::{Error, Result};

pub use fixtures::*;

/// External step that records every invocation instead of running anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingStep {
    invocations: Vec<StepInvocation>,
    fail_on: Option<ProjectPath>,
}

impl RecordingStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an exit code of 2 when asked to handle `project`.
    pub fn fail_on(mut self, project: &ProjectPath) -> Self {
        self.fail_on = Some(project.clone());
        self
    }

    pub fn invocations(&self) -> &[StepInvocation] {
        &self.invocations
    }

    /// Directory names of the invoked projects, in call order.
    pub fn projects(&self) -> Vec<&str> {
        self.invocations
            .iter()
            .map(|inv| inv.project.file_name())
            .collect()
    }

    /// `(action, directory name)` pairs, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|inv| format!("{} {}", inv.action, inv.project.file_name()))
            .collect()
    }

    /// First invocation for the project directory called `name`.
    pub fn invocation_of(&self, name: &str) -> Option<&StepInvocation> {
        self.invocations
            .iter()
            .find(|inv| inv.project.file_name() == name)
    }
}

impl ExternalStep for RecordingStep {
    fn run(&mut self, invocation: &StepInvocation) -> Result<()> {
        self.invocations.push(invocation.clone());

        if self.fail_on.as_ref() == Some(&invocation.project) {
            return Err(Error::ExternalStepFailure {
                action: invocation.action,
                project: invocation.project.to_string(),
                code: Some(2),
            });
        }
        Ok(())
    }

    fn describe(&self, invocation: &StepInvocation) -> String {
        format!(
            "record {} {} TARGET={}",
            invocation.action, invocation.project, invocation.target
        )
    }
}
