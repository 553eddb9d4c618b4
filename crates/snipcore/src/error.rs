use crate::{DependencyRef, NodeId, TypeTag};
use thiserror::Error;

/// Top-level error for fallible host operations.
///
/// Per-node execution errors never appear here; those are contained at the
/// engine boundary and turned into `Outcome::Failed` data.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("dependency error: {0}")]
    Dependency(#[from] DependencyError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure while a snippet's registration hook populates its builder.
/// Fatal to that snippet's load only; other snippets keep loading.
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    #[error("duplicate {namespace} name '{name}'")]
    DuplicatePort { namespace: &'static str, name: String },

    #[error("empty {namespace} name")]
    EmptyName { namespace: &'static str },

    #[error("duplicate dependency '{0}'")]
    DuplicateDependency(String),

    #[error("registration hook failed: {0}")]
    HookFailed(String),
}

/// A dependency could not be satisfied by the installation capability.
/// The ref stays unsatisfied so a later `ensure` can retry.
#[derive(Error, Debug, Clone)]
#[error("failed to satisfy dependency '{dep}': {cause}")]
pub struct DependencyError {
    pub dep: DependencyRef,
    pub cause: String,
}

/// Failure reported by the external package-installation capability.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct InstallError(pub String);

/// Coercion or validation failure at a consuming port.
#[derive(Error, Debug, Clone)]
#[error("invalid value for port '{port}': expected {expected}, got {actual}")]
pub struct TypeError {
    pub expected: TypeTag,
    pub actual: String,
    pub port: String,
}

/// Per-node execution failure. Contained by the execution engine and
/// recorded as a failed outcome, never propagated past it.
#[derive(Error, Debug, Clone)]
pub enum RunError {
    #[error("missing required input '{0}'")]
    MissingInput(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("snippet did not produce required output '{0}'")]
    MissingOutput(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error("{0}")]
    Raised(String),

    #[error("snippet panicked: {0}")]
    Panicked(String),

    #[error("execution cancelled")]
    Cancelled,
}

/// Malformed graph definition or lookup failure during a graph pass.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("cyclic dependency detected")]
    CyclicDependency,

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("unknown snippet: {0}")]
    UnknownSnippet(String),

    #[error("input port '{port}' of node {node} is already wired")]
    DuplicateInputWire { node: NodeId, port: String },

    #[error("internal task failure: {0}")]
    Internal(String),
}
