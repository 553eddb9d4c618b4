//! Snippet execution host runtime
//!
//! This crate provides the runtime around the core types: the snippet
//! registry/loader, the dependency gate, the type marshaler, the per-node
//! execution engine, the output router, and the whole-graph runner.

mod engine;
mod gate;
mod host;
mod marshal;
mod registry;
mod router;
mod runner;

pub use engine::ExecutionEngine;
pub use gate::{DependencyGate, Installer, NullInstaller};
pub use host::{HostConfig, SnippetHost};
pub use marshal::coerce;
pub use registry::SnippetRegistry;
pub use router::route;
pub use runner::{GraphReport, GraphRunner};
