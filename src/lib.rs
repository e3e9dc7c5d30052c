//! mdmake - a meta-build orchestrator for trees of makefile projects
//!
//! Every project directory carries an `mdMake` descriptor naming its artifact,
//! output directory and dependency projects. This crate discovers the
//! dependency graph from a root project and runs an external build or clean
//! step for each project, dependencies first, once per requested target.

pub mod builder;
pub mod core;
pub mod errors;
pub mod ops;
pub mod util;

/// Test utilities for mdmake unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides on-disk project trees and a recording stand-in for `make`.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{DependencyGraph, DescriptorReader, ProjectPath, Target};
pub use builder::{ExternalStep, MakeStep};
pub use errors::{Error, Result};
pub use ops::{Mode, RunOptions, TargetRunner};
pub use util::shell::Shell;
