//! Dependency graph discovery.
//!
//! The graph is discovered breadth-first from a root project, reading each
//! reachable descriptor exactly once, and is rebuilt from scratch for every
//! target of a run. Orchestrators borrow it mutably to flip the per-project
//! `done` flags; nothing about it is global.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::core::descriptor::DescriptorReader;
use crate::core::path::{ProjectPath, TrackedPath};
use crate::core::target::Target;
use crate::errors::{Error, Result};

/// Mutable per-run state and build metadata of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    /// Built (or cleaned) during the current phase
    pub done: bool,
    pub name: String,
    /// Output directory relative to the project
    pub out_dir: String,
    /// `<target>/<name>`, relative to `out_dir`; none for aggregators
    pub artifact: Option<String>,
    /// Absolute publish directory
    pub link_destination: Option<String>,
}

impl ProjectRecord {
    /// Aggregators only list further dependencies and are never invoked.
    pub fn is_aggregator(&self) -> bool {
        self.artifact.is_none()
    }
}

/// Where a project's artifact is published, as handed to the external step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Absolute path of the project's own artifact
    pub source: String,
    /// Absolute publish directory
    pub destination: String,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    root: ProjectPath,
    target: Target,
    root_buildable: bool,
    /// Discovery (breadth-first) order
    order: Vec<ProjectPath>,
    dependencies: HashMap<ProjectPath, Vec<ProjectPath>>,
    records: HashMap<ProjectPath, ProjectRecord>,
}

impl DependencyGraph {
    /// Discover every project reachable from `root`.
    pub fn discover(
        reader: &DescriptorReader,
        root: &ProjectPath,
        target: Target,
    ) -> Result<Self> {
        let mut graph = DependencyGraph {
            root: root.clone(),
            target,
            root_buildable: false,
            order: Vec::new(),
            dependencies: HashMap::new(),
            records: HashMap::new(),
        };

        let mut queue = VecDeque::from([root.clone()]);
        let mut visited = HashSet::new();
        graph.records.insert(root.clone(), ProjectRecord::default());

        while let Some(project) = queue.pop_front() {
            if !visited.insert(project.clone()) {
                continue;
            }

            let descriptor = reader.open(&project)?;
            let declared = descriptor.project();
            tracing::debug!(
                "visiting {} ({} dependencies)",
                project,
                declared.dependencies.len()
            );

            // dependencies are declared relative to the declaring project
            let base = TrackedPath::new(project.as_str());
            let deps = declared
                .dependencies
                .iter()
                .map(|dep| base.appended(dep).map(ProjectPath::from))
                .collect::<Result<Vec<_>>>()?;

            let link_destination = match declared.output_link {
                Some(ref link) => {
                    let mut path = TrackedPath::new(project.as_str());
                    path.append(link)?;
                    Some(path.into_string())
                }
                None => None,
            };

            let artifact = if !declared.name.is_empty() && !declared.out_dir.is_empty() {
                Some(format!("{}/{}", target, declared.name))
            } else {
                None
            };

            if project == *root {
                graph.root_buildable = descriptor.includes_build_rules() && artifact.is_some();
            }

            graph.records.insert(
                project.clone(),
                ProjectRecord {
                    done: false,
                    name: declared.name,
                    out_dir: declared.out_dir,
                    artifact,
                    link_destination,
                },
            );

            for dep in &deps {
                if !visited.contains(dep) && !queue.contains(dep) {
                    queue.push_back(dep.clone());
                    graph.records.entry(dep.clone()).or_default();
                }
            }

            graph.dependencies.insert(project.clone(), deps);
            graph.order.push(project);
        }

        tracing::debug!(
            "discovered {} project(s) for {}",
            graph.order.len(),
            target
        );
        Ok(graph)
    }

    pub fn root(&self) -> &ProjectPath {
        &self.root
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Whether the root itself is built, rather than only its dependencies.
    ///
    /// The root opts in by including the shared build rules and declaring an
    /// artifact.
    pub fn is_root_buildable(&self) -> bool {
        self.root_buildable
    }

    /// Projects in discovery order, root first.
    pub fn projects(&self) -> &[ProjectPath] {
        &self.order
    }

    pub fn contains(&self, project: &ProjectPath) -> bool {
        self.records.contains_key(project)
    }

    /// Immediate dependencies of `project`, in declaration order.
    pub fn dependencies(&self, project: &ProjectPath) -> &[ProjectPath] {
        self.dependencies
            .get(project)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn record(&self, project: &ProjectPath) -> Option<&ProjectRecord> {
        self.records.get(project)
    }

    pub fn is_done(&self, project: &ProjectPath) -> bool {
        self.records.get(project).is_some_and(|record| record.done)
    }

    pub fn mark_done(&mut self, project: &ProjectPath) {
        if let Some(record) = self.records.get_mut(project) {
            record.done = true;
        }
    }

    /// Clear every `done` flag, between the phases of a rebuild.
    pub fn reset_flags(&mut self) {
        for record in self.records.values_mut() {
            record.done = false;
        }
    }

    /// Absolute path of the artifact `project` produces.
    pub fn artifact_path(&self, project: &ProjectPath) -> Result<Option<String>> {
        let Some(record) = self.records.get(project) else {
            return Ok(None);
        };
        let Some(ref artifact) = record.artifact else {
            return Ok(None);
        };

        let path = TrackedPath::new(project.as_str())
            .appended(&format!("{}{}", record.out_dir, artifact))?;
        Ok(Some(path.trim_end_matches('/').to_string()))
    }

    /// Link source and destination of `project`; both empty unless
    /// `OUTPUT_LINK` was declared.
    pub fn link(&self, project: &ProjectPath) -> Result<Link> {
        let Some(record) = self.records.get(project) else {
            return Ok(Link::default());
        };
        let Some(ref destination) = record.link_destination else {
            return Ok(Link::default());
        };

        let source = if record.is_aggregator() {
            String::new()
        } else {
            let mut out = TrackedPath::new(project.as_str());
            out.append(&format!("{}{}/", record.out_dir, self.target))?;
            format!("{}{}", out, record.name)
        };

        Ok(Link {
            source,
            destination: destination.clone(),
        })
    }

    /// Fail with the members of the first dependency cycle, if there is one.
    pub fn check_acyclic(&self) -> Result<()> {
        let mut graph = DiGraph::<&ProjectPath, ()>::new();
        let nodes: HashMap<&ProjectPath, NodeIndex> = self
            .order
            .iter()
            .map(|project| (project, graph.add_node(project)))
            .collect();

        for (project, deps) in &self.dependencies {
            for dep in deps {
                if let (Some(&from), Some(&to)) = (nodes.get(project), nodes.get(dep)) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| graph.contains_edge(node, node));
            if !cyclic {
                continue;
            }

            let mut members: Vec<&ProjectPath> =
                component.iter().map(|&node| graph[node]).collect();
            members.sort_by_key(|project| self.order.iter().position(|p| p == *project));

            let mut projects: Vec<String> = members.iter().map(|p| p.to_string()).collect();
            projects.push(projects[0].clone());
            return Err(Error::DependencyCycle { projects });
        }

        Ok(())
    }

    /// Serializable view of the graph for the `extrainfo` dump.
    pub fn snapshot(&self) -> GraphSnapshot<'_> {
        GraphSnapshot {
            root: &self.root,
            target: self.target,
            root_buildable: self.root_buildable,
            projects: self
                .order
                .iter()
                .map(|path| ProjectSnapshot {
                    path,
                    record: &self.records[path],
                    dependencies: self.dependencies(path),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GraphSnapshot<'a> {
    pub root: &'a ProjectPath,
    pub target: Target,
    pub root_buildable: bool,
    pub projects: Vec<ProjectSnapshot<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ProjectSnapshot<'a> {
    pub path: &'a ProjectPath,
    #[serde(flatten)]
    pub record: &'a ProjectRecord,
    pub dependencies: &'a [ProjectPath],
}
