//! Per-target driver.
//!
//! Every target gets a freshly discovered graph, so `done` flags never leak
//! from one target into the next.

use crate::builder::step::ExternalStep;
use crate::core::descriptor::DescriptorReader;
use crate::core::graph::DependencyGraph;
use crate::core::path::ProjectPath;
use crate::core::target::Target;
use crate::errors::{Error, Result};
use crate::ops::{BuildOrchestrator, CleanOrchestrator};
use crate::util::shell::{Shell, Status};

/// What a run does for each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Build,
    /// Clean the dependencies, the root, or both
    Clean { dependencies: bool, root: bool },
    /// Clean everything, then build everything
    Rebuild,
}

impl Mode {
    /// Combine the `clean`, `cleandeps`, `cleanall` and `rebuild` keywords.
    pub fn from_flags(
        clean: bool,
        clean_deps: bool,
        clean_all: bool,
        rebuild: bool,
    ) -> Result<Mode> {
        let cleaning = clean || clean_deps || clean_all;
        if rebuild && cleaning {
            return Err(Error::config(
                "`rebuild` cannot be combined with `clean`, `cleandeps` or `cleanall`",
            ));
        }

        Ok(if rebuild {
            Mode::Rebuild
        } else if cleaning {
            Mode::Clean {
                dependencies: clean_deps || clean_all,
                root: clean || clean_all,
            }
        } else {
            Mode::Build
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root: ProjectPath,
    /// Processed in this order
    pub targets: Vec<Target>,
    pub mode: Mode,
    /// Dump each discovered graph as JSON on stdout
    pub extra_info: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
    pub target: Target,
    pub projects: usize,
    pub invocations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub targets: Vec<TargetSummary>,
}

impl RunSummary {
    pub fn invocations(&self) -> usize {
        self.targets.iter().map(|t| t.invocations).sum()
    }
}

pub struct TargetRunner<'a> {
    reader: &'a DescriptorReader,
    step: &'a mut dyn ExternalStep,
    shell: &'a Shell,
}

impl<'a> TargetRunner<'a> {
    pub fn new(
        reader: &'a DescriptorReader,
        step: &'a mut dyn ExternalStep,
        shell: &'a Shell,
    ) -> Self {
        TargetRunner {
            reader,
            step,
            shell,
        }
    }

    /// Run `options.mode` for every target, stopping at the first failure.
    pub fn run(&mut self, options: &RunOptions) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for &target in &options.targets {
            self.shell.status(
                Status::Discovering,
                format!("{} from {}", target, options.root),
            );

            let mut graph = DependencyGraph::discover(self.reader, &options.root, target)?;
            graph.check_acyclic()?;

            if options.extra_info {
                self.dump(&graph);
            }

            let invocations = match options.mode {
                Mode::Build => self.build(&mut graph)?,
                Mode::Clean { dependencies, root } => {
                    self.clean(&mut graph, dependencies, root)?
                }
                Mode::Rebuild => {
                    let cleaned = self.clean(&mut graph, true, true)?;
                    graph.reset_flags();
                    cleaned + self.build(&mut graph)?
                }
            };

            summary.targets.push(TargetSummary {
                target,
                projects: graph.projects().len(),
                invocations,
            });
        }

        Ok(summary)
    }

    fn build(&mut self, graph: &mut DependencyGraph) -> Result<usize> {
        BuildOrchestrator::new(graph, &mut *self.step, self.shell).build_all()
    }

    fn clean(
        &mut self,
        graph: &mut DependencyGraph,
        dependencies: bool,
        root: bool,
    ) -> Result<usize> {
        let mut cleaner = CleanOrchestrator::new(graph, &mut *self.step, self.shell);
        if dependencies {
            cleaner.clean_dependencies()?;
        }
        if root {
            cleaner.clean_root()?;
        }
        Ok(cleaner.invocations())
    }

    fn dump(&self, graph: &DependencyGraph) {
        match serde_json::to_string_pretty(&graph.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("failed to serialize dependency graph: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{descriptors, ProjectTree, RecordingStep};

    fn tree() -> ProjectTree {
        ProjectTree::new()
            .with_project("app", &descriptors::library("app", &["../lib"]))
            .with_project("lib", &descriptors::library("liblib.a", &[]))
    }

    fn options(tree: &ProjectTree, targets: Vec<Target>, mode: Mode) -> RunOptions {
        RunOptions {
            root: tree.project("app"),
            targets,
            mode,
            extra_info: false,
        }
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(
            Mode::from_flags(false, false, false, false).unwrap(),
            Mode::Build
        );
        assert_eq!(
            Mode::from_flags(false, false, false, true).unwrap(),
            Mode::Rebuild
        );
        assert_eq!(
            Mode::from_flags(true, false, false, false).unwrap(),
            Mode::Clean {
                dependencies: false,
                root: true
            }
        );
        assert_eq!(
            Mode::from_flags(false, true, false, false).unwrap(),
            Mode::Clean {
                dependencies: true,
                root: false
            }
        );
        assert_eq!(
            Mode::from_flags(true, false, true, false).unwrap(),
            Mode::Clean {
                dependencies: true,
                root: true
            }
        );

        let err = Mode::from_flags(false, true, false, true).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_targets_processed_in_order() {
        let tree = tree();
        let reader = tree.reader();
        let mut step = RecordingStep::new();
        let shell = Shell::quiet();

        let summary = TargetRunner::new(&reader, &mut step, &shell)
            .run(&options(&tree, vec![Target::Release, Target::Debug], Mode::Build))
            .unwrap();

        let seen: Vec<String> = step
            .invocations()
            .iter()
            .map(|inv| format!("{} {}", inv.target, inv.project.file_name()))
            .collect();
        assert_eq!(
            seen,
            vec!["release lib", "release app", "debug lib", "debug app"]
        );

        assert_eq!(summary.targets.len(), 2);
        assert_eq!(summary.targets[0].projects, 2);
        assert_eq!(summary.invocations(), 4);
    }

    #[test]
    fn test_clean_all_cleans_dependencies_then_root() {
        let tree = tree();
        let reader = tree.reader();
        let mut step = RecordingStep::new();
        let shell = Shell::quiet();

        let mode = Mode::from_flags(false, false, true, false).unwrap();
        TargetRunner::new(&reader, &mut step, &shell)
            .run(&options(&tree, vec![Target::Debug], mode))
            .unwrap();

        assert_eq!(step.calls(), vec!["clean lib", "clean app"]);
    }

    #[test]
    fn test_rebuild_cleans_before_building() {
        let tree = tree();
        let reader = tree.reader();
        let mut step = RecordingStep::new();
        let shell = Shell::quiet();

        let summary = TargetRunner::new(&reader, &mut step, &shell)
            .run(&options(&tree, vec![Target::Debug], Mode::Rebuild))
            .unwrap();

        assert_eq!(
            step.calls(),
            vec!["clean lib", "clean app", "build lib", "build app"]
        );
        assert_eq!(summary.invocations(), 4);
    }

    #[test]
    fn test_failure_stops_remaining_targets() {
        let tree = tree();
        let reader = tree.reader();
        let mut step = RecordingStep::new().fail_on(&tree.project("lib"));
        let shell = Shell::quiet();

        let err = TargetRunner::new(&reader, &mut step, &shell)
            .run(&options(&tree, vec![Target::Debug, Target::Release], Mode::Build))
            .unwrap_err();

        assert!(matches!(err, Error::ExternalStepFailure { .. }));
        assert_eq!(step.invocations().len(), 1);
    }

    #[test]
    fn test_cycle_fails_before_any_step() {
        let tree = ProjectTree::new()
            .with_project("app", &descriptors::library("app", &["../lib"]))
            .with_project("lib", &descriptors::library("liblib.a", &["../app"]));
        let reader = tree.reader();
        let mut step = RecordingStep::new();
        let shell = Shell::quiet();

        let err = TargetRunner::new(&reader, &mut step, &shell)
            .run(&options(&tree, vec![Target::Debug], Mode::Build))
            .unwrap_err();

        assert!(matches!(err, Error::DependencyCycle { .. }));
        assert!(step.invocations().is_empty());
    }

    #[test]
    fn test_root_without_descriptor() {
        let tree = ProjectTree::new().with_dir("empty");
        let reader = tree.reader();
        let mut step = RecordingStep::new();
        let shell = Shell::quiet();

        let run = RunOptions {
            root: tree.project("empty"),
            targets: vec![Target::Debug],
            mode: Mode::Build,
            extra_info: true,
        };
        let err = TargetRunner::new(&reader, &mut step, &shell)
            .run(&run)
            .unwrap_err();

        assert!(matches!(err, Error::DescriptorNotFound { .. }));
    }
}
