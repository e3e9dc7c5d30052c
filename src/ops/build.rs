//! Dependency-first building.

use crate::builder::step::{ExternalStep, StepInvocation};
use crate::core::graph::DependencyGraph;
use crate::core::path::ProjectPath;
use crate::errors::{Result, StepAction};
use crate::ops::invoke;
use crate::util::shell::Shell;

/// Builds projects in post-order, each at most once per phase.
pub struct BuildOrchestrator<'a> {
    graph: &'a mut DependencyGraph,
    step: &'a mut dyn ExternalStep,
    shell: &'a Shell,
    invoked: usize,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(
        graph: &'a mut DependencyGraph,
        step: &'a mut dyn ExternalStep,
        shell: &'a Shell,
    ) -> Self {
        BuildOrchestrator {
            graph,
            step,
            shell,
            invoked: 0,
        }
    }

    /// Number of external steps run so far.
    pub fn invocations(&self) -> usize {
        self.invoked
    }

    /// Build every dependency of every discovered project, then the root if
    /// it opted in to being built.
    pub fn build_all(&mut self) -> Result<usize> {
        let projects = self.graph.projects().to_vec();
        for project in &projects {
            for dep in self.graph.dependencies(project).to_vec() {
                self.build(&dep)?;
            }
        }

        if self.graph.is_root_buildable() {
            let root = self.graph.root().clone();
            self.build(&root)?;
        } else {
            tracing::debug!("root {} is not buildable, skipping", self.graph.root());
        }

        Ok(self.invoked)
    }

    /// Build `project` after all of its dependencies.
    pub fn build(&mut self, project: &ProjectPath) -> Result<()> {
        if self.graph.is_done(project) {
            return Ok(());
        }

        let mut artifacts = Vec::new();
        for dep in self.graph.dependencies(project).to_vec() {
            self.build(&dep)?;
            if let Some(path) = self.graph.artifact_path(&dep)? {
                artifacts.push(path);
            }
        }

        let record = self.graph.record(project).cloned().unwrap_or_default();
        if record.is_aggregator() {
            tracing::debug!("{} has no artifact, not invoking", project);
            self.graph.mark_done(project);
            return Ok(());
        }

        let link = self.graph.link(project)?;
        let invocation = StepInvocation {
            action: StepAction::Build,
            project: project.clone(),
            target: self.graph.target(),
            name: record.name,
            dependencies: artifacts,
            link_source: link.source,
            link_destination: link.destination,
        };

        invoke(&mut *self.step, self.shell, &invocation)?;
        self.invoked += 1;
        self.graph.mark_done(project);
        Ok(())
    }
}
