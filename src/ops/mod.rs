//! High-level operations.
//!
//! The orchestrators walk a discovered [`DependencyGraph`] and hand each
//! project to an [`ExternalStep`]; [`TargetRunner`] drives them once per
//! requested target.
//!
//! [`DependencyGraph`]: crate::core::graph::DependencyGraph

pub mod build;
pub mod clean;
pub mod runner;

pub use build::BuildOrchestrator;
pub use clean::CleanOrchestrator;
pub use runner::{Mode, RunOptions, RunSummary, TargetRunner, TargetSummary};

use crate::builder::step::{ExternalStep, StepInvocation};
use crate::errors::{Result, StepAction};
use crate::util::shell::{Shell, Status};

/// Announce and run one step.
fn invoke(step: &mut dyn ExternalStep, shell: &Shell, invocation: &StepInvocation) -> Result<()> {
    let status = match invocation.action {
        StepAction::Build => Status::Building,
        StepAction::Clean => Status::Cleaning,
    };
    shell.status(status, format!("{} {}", invocation.target, invocation.name));
    shell.command(step.describe(invocation));

    tracing::debug!("{} {} ({})", invocation.action, invocation.project, invocation.target);
    step.run(invocation)
}
