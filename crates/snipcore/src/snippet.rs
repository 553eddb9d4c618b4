use crate::{PortSchema, RegistrationError, RunError, TypeTag, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// External package requirement declared by a snippet.
///
/// Equality and hashing cover both fields, so the same package pinned to
/// two constraints counts as two distinct requirements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRef {
    pub package_name: String,
    pub version_constraint: Option<String>,
}

impl DependencyRef {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            version_constraint: None,
        }
    }

    pub fn versioned(package_name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            version_constraint: Some(constraint.into()),
        }
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_constraint {
            Some(c) => write!(f, "{} ({})", self.package_name, c),
            None => f.write_str(&self.package_name),
        }
    }
}

/// Core trait every executable snippet implements.
#[async_trait]
pub trait Snippet: Send + Sync {
    /// Unique snippet identifier (e.g. "math.add", "string.remove_index").
    fn id(&self) -> &str;

    /// Registration hook: declare ports, parameters, and dependencies by
    /// calling the builder's `add_*` methods.
    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError>;

    /// Entry point: resolved inputs and parameters in, outputs out.
    /// Returning `Err` signals failure; the engine contains it.
    async fn run(
        &self,
        inputs: &HashMap<String, Value>,
        parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError>;
}

/// Capability object handed to a snippet's registration hook.
///
/// Validates name uniqueness within each namespace at call time and fails
/// fast on collision.
#[derive(Debug, Default)]
pub struct SnippetBuilder {
    inputs: Vec<PortSchema>,
    outputs: Vec<PortSchema>,
    parameters: Vec<PortSchema>,
    dependencies: HashSet<DependencyRef>,
}

impl SnippetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required input with no declared kind (opaque passthrough).
    pub fn add_input(&mut self, name: impl Into<String>) -> Result<(), RegistrationError> {
        self.add_input_typed(name, TypeTag::Passthrough)
    }

    /// Declare a required input of a specific kind.
    pub fn add_input_typed(
        &mut self,
        name: impl Into<String>,
        kind: TypeTag,
    ) -> Result<(), RegistrationError> {
        Self::insert(&mut self.inputs, "input", PortSchema::required(name, kind))
    }

    /// Declare an input that may be left unwired.
    pub fn add_optional_input(
        &mut self,
        name: impl Into<String>,
        kind: TypeTag,
    ) -> Result<(), RegistrationError> {
        Self::insert(&mut self.inputs, "input", PortSchema::optional(name, kind))
    }

    /// Declare an output the entry point must produce.
    pub fn add_output(&mut self, name: impl Into<String>) -> Result<(), RegistrationError> {
        self.add_output_typed(name, TypeTag::Passthrough)
    }

    pub fn add_output_typed(
        &mut self,
        name: impl Into<String>,
        kind: TypeTag,
    ) -> Result<(), RegistrationError> {
        Self::insert(&mut self.outputs, "output", PortSchema::required(name, kind))
    }

    /// Declare an output the entry point may omit.
    pub fn add_optional_output(
        &mut self,
        name: impl Into<String>,
        kind: TypeTag,
    ) -> Result<(), RegistrationError> {
        Self::insert(&mut self.outputs, "output", PortSchema::optional(name, kind))
    }

    /// Declare a tunable parameter, supplied externally rather than wired.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        kind: TypeTag,
    ) -> Result<(), RegistrationError> {
        Self::insert(
            &mut self.parameters,
            "parameter",
            PortSchema::required(name, kind),
        )
    }

    pub fn add_optional_parameter(
        &mut self,
        name: impl Into<String>,
        kind: TypeTag,
    ) -> Result<(), RegistrationError> {
        Self::insert(
            &mut self.parameters,
            "parameter",
            PortSchema::optional(name, kind),
        )
    }

    /// Declare an external package dependency.
    pub fn add_dependency(
        &mut self,
        package_name: impl Into<String>,
        version_constraint: Option<&str>,
    ) -> Result<(), RegistrationError> {
        let dep = DependencyRef {
            package_name: package_name.into(),
            version_constraint: version_constraint.map(str::to_string),
        };
        if !self.dependencies.insert(dep.clone()) {
            return Err(RegistrationError::DuplicateDependency(dep.to_string()));
        }
        Ok(())
    }

    fn insert(
        group: &mut Vec<PortSchema>,
        namespace: &'static str,
        schema: PortSchema,
    ) -> Result<(), RegistrationError> {
        if schema.name.is_empty() {
            return Err(RegistrationError::EmptyName { namespace });
        }
        if group.iter().any(|p| p.name == schema.name) {
            return Err(RegistrationError::DuplicatePort {
                namespace,
                name: schema.name,
            });
        }
        group.push(schema);
        Ok(())
    }

    /// Seal the builder into an immutable descriptor.
    pub fn into_descriptor(self, id: String, entrypoint: Arc<dyn Snippet>) -> SnippetDescriptor {
        SnippetDescriptor {
            id,
            inputs: self.inputs,
            outputs: self.outputs,
            parameters: self.parameters,
            dependencies: self.dependencies,
            entrypoint,
        }
    }
}

/// A loaded snippet's declared surface plus a handle to its entry point.
///
/// Immutable once registration completes; a reload replaces the whole
/// descriptor, it is never mutated in place.
#[derive(Clone)]
pub struct SnippetDescriptor {
    pub id: String,
    pub inputs: Vec<PortSchema>,
    pub outputs: Vec<PortSchema>,
    pub parameters: Vec<PortSchema>,
    pub dependencies: HashSet<DependencyRef>,
    entrypoint: Arc<dyn Snippet>,
}

impl SnippetDescriptor {
    pub fn entrypoint(&self) -> &Arc<dyn Snippet> {
        &self.entrypoint
    }

    pub fn input(&self, name: &str) -> Option<&PortSchema> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&PortSchema> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&PortSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Debug for SnippetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnippetDescriptor")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("parameters", &self.parameters)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
