//! Core abstractions for the snippet execution host
//!
//! This crate provides the fundamental types that all other components
//! depend on: the dynamic value model, port schemas, the snippet trait and
//! its registration builder, graph wiring, the error taxonomy, and the
//! per-run result report.

mod error;
pub mod events;
mod report;
mod schema;
mod snippet;
mod value;
mod wiring;

pub use error::{
    DependencyError, GraphError, HostError, InstallError, RegistrationError, RunError, TypeError,
};
pub use report::{ErrorRecord, ExecutionResult, LogEntry, Outcome, ResultBuilder};
pub use schema::{PortSchema, TypeTag};
pub use snippet::{DependencyRef, Snippet, SnippetBuilder, SnippetDescriptor};
pub use value::Value;
pub use wiring::{GraphId, GraphSpec, NodeBinding, NodeId, WireEdge, WiringTable};
pub use events::{EventBus, ExecutionEvent, ExecutionId};
