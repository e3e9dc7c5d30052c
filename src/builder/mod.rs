//! The per-project external step.
//!
//! mdmake never compiles anything itself; each project is handed to an
//! [`ExternalStep`], normally `make` running the shared build rules.

pub mod step;

pub use step::{ExternalStep, MakeStep, StepInvocation};
