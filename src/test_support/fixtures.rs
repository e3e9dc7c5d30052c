//! Test fixtures for project trees on disk.

use std::path::Path;

use tempfile::TempDir;

use crate::core::descriptor::DescriptorReader;
use crate::core::graph::DependencyGraph;
use crate::core::path::ProjectPath;
use crate::core::target::Target;

/// A temporary directory holding one subdirectory per project, each with an
/// `mdMake` descriptor.
#[derive(Debug)]
pub struct ProjectTree {
    _dir: TempDir,
    /// Canonical root, `/`-terminated
    root: String,
}

impl ProjectTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        // macOS hands out symlinked temp dirs
        let canonical = dir
            .path()
            .canonicalize()
            .expect("failed to canonicalize temp dir");
        let root = ProjectPath::new(canonical.to_string_lossy()).as_str().to_string();

        ProjectTree { _dir: dir, root }
    }

    /// Add `<root>/<name>/mdMake` with the given contents.
    pub fn with_project(self, name: &str, descriptor: &str) -> Self {
        let dir = Path::new(&self.root).join(name);
        std::fs::create_dir_all(&dir).expect("failed to create project dir");
        std::fs::write(dir.join("mdMake"), descriptor).expect("failed to write descriptor");
        self
    }

    /// Add an empty directory with no descriptor.
    pub fn with_dir(self, name: &str) -> Self {
        std::fs::create_dir_all(Path::new(&self.root).join(name))
            .expect("failed to create directory");
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute project path of `name`.
    pub fn project(&self, name: &str) -> ProjectPath {
        ProjectPath::new(format!("{}{}", self.root, name))
    }

    pub fn reader(&self) -> DescriptorReader {
        DescriptorReader::new("mdMake", "mdMake.common").expect("valid build rules name")
    }

    /// Discover the graph rooted at project `name`.
    pub fn discover(&self, name: &str, target: Target) -> DependencyGraph {
        DependencyGraph::discover(&self.reader(), &self.project(name), target)
            .expect("discovery failed")
    }
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor snippets.
pub mod descriptors {
    /// A library that includes the shared build rules.
    pub fn library(name: &str, deps: &[&str]) -> String {
        format!(
            "NAME := {name}\nOUT_DIR := out\nDEPENDENCIES := {}\n-include ../mdMake.common\n",
            deps.join(" ")
        )
    }

    /// A project that only lists other projects.
    pub fn aggregator(deps: &[&str]) -> String {
        format!("DEPENDENCIES := {}\n", deps.join(" "))
    }
}
