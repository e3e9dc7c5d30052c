//! Core data structures for mdmake.
//!
//! This module contains the types the orchestrators work on:
//! - Project paths and the relative-path algebra
//! - Build targets
//! - Project descriptors
//! - The discovered dependency graph

pub mod descriptor;
pub mod graph;
pub mod path;
pub mod target;

pub use descriptor::{DescriptorReader, ProjectDescriptor};
pub use graph::{DependencyGraph, Link, ProjectRecord};
pub use path::{ProjectPath, TrackedPath};
pub use target::Target;
