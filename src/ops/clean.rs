//! Cleaning, in the same order things are built.

use crate::builder::step::{ExternalStep, StepInvocation};
use crate::core::graph::DependencyGraph;
use crate::core::path::ProjectPath;
use crate::errors::{Result, StepAction};
use crate::ops::invoke;
use crate::util::shell::Shell;

pub struct CleanOrchestrator<'a> {
    graph: &'a mut DependencyGraph,
    step: &'a mut dyn ExternalStep,
    shell: &'a Shell,
    invoked: usize,
}

impl<'a> CleanOrchestrator<'a> {
    pub fn new(
        graph: &'a mut DependencyGraph,
        step: &'a mut dyn ExternalStep,
        shell: &'a Shell,
    ) -> Self {
        CleanOrchestrator {
            graph,
            step,
            shell,
            invoked: 0,
        }
    }

    pub fn invocations(&self) -> usize {
        self.invoked
    }

    /// Clean the dependencies of `project`, then `project` itself.
    ///
    /// Recursion continues through projects that are already clean so that
    /// everything below them is reached.
    pub fn clean(&mut self, project: &ProjectPath) -> Result<()> {
        for dep in self.graph.dependencies(project).to_vec() {
            self.clean(&dep)?;
        }
        self.clean_project(project)
    }

    /// Clean every dependency of every discovered project. The root is left
    /// alone.
    pub fn clean_dependencies(&mut self) -> Result<usize> {
        let projects = self.graph.projects().to_vec();
        for project in &projects {
            for dep in self.graph.dependencies(project).to_vec() {
                self.clean(&dep)?;
            }
        }
        Ok(self.invoked)
    }

    /// Clean the root's own outputs only, when it is buildable.
    pub fn clean_root(&mut self) -> Result<usize> {
        if self.graph.is_root_buildable() {
            let root = self.graph.root().clone();
            self.clean_project(&root)?;
        } else {
            tracing::debug!("root {} is not buildable, nothing to clean", self.graph.root());
        }
        Ok(self.invoked)
    }

    fn clean_project(&mut self, project: &ProjectPath) -> Result<()> {
        if self.graph.is_done(project) {
            return Ok(());
        }

        let record = self.graph.record(project).cloned().unwrap_or_default();
        if record.is_aggregator() {
            self.graph.mark_done(project);
            return Ok(());
        }

        let link = self.graph.link(project)?;
        let invocation = StepInvocation {
            action: StepAction::Clean,
            project: project.clone(),
            target: self.graph.target(),
            name: record.name,
            dependencies: Vec::new(),
            link_source: link.source,
            link_destination: link.destination,
        };

        invoke(&mut *self.step, self.shell, &invocation)?;
        self.invoked += 1;
        self.graph.mark_done(project);
        Ok(())
    }
}
