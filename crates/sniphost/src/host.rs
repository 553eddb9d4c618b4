use crate::{
    DependencyGate, ExecutionEngine, GraphReport, GraphRunner, Installer, NullInstaller,
    SnippetRegistry,
};
use snipcore::{
    EventBus, ExecutionEvent, ExecutionId, ExecutionResult, GraphError, GraphSpec, HostError,
    NodeId, RegistrationError, Snippet, SnippetDescriptor, Value,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Main facade tying registry, dependency gate, engine, and event bus
/// together.
pub struct SnippetHost {
    registry: Arc<SnippetRegistry>,
    gate: Arc<DependencyGate>,
    engine: Arc<ExecutionEngine>,
    runner: GraphRunner,
    events: Arc<EventBus>,
}

impl SnippetHost {
    /// Host without a package installer; fine as long as no loaded snippet
    /// declares dependencies.
    pub fn new() -> Self {
        Self::with_installer(Arc::new(NullInstaller))
    }

    pub fn with_installer(installer: Arc<dyn Installer>) -> Self {
        Self::with_config(installer, HostConfig::default())
    }

    pub fn with_config(installer: Arc<dyn Installer>, config: HostConfig) -> Self {
        let events = Arc::new(EventBus::new(config.event_buffer_size));
        let gate = Arc::new(DependencyGate::new(installer));
        let engine = Arc::new(ExecutionEngine::new(gate.clone(), events.clone()));
        Self {
            registry: Arc::new(SnippetRegistry::new()),
            gate,
            engine,
            runner: GraphRunner::new(config.max_parallel_nodes),
            events,
        }
    }

    pub fn registry(&self) -> &Arc<SnippetRegistry> {
        &self.registry
    }

    pub fn gate(&self) -> &Arc<DependencyGate> {
        &self.gate
    }

    pub async fn load_snippet(
        &self,
        source: Arc<dyn Snippet>,
    ) -> Result<Arc<SnippetDescriptor>, RegistrationError> {
        self.registry.load(source).await
    }

    pub async fn reload_snippet(
        &self,
        source: Arc<dyn Snippet>,
    ) -> Result<Arc<SnippetDescriptor>, RegistrationError> {
        self.registry.reload(source).await
    }

    /// Execute a single node of a registered snippet.
    pub async fn run_node(
        &self,
        node: NodeId,
        snippet_id: &str,
        inputs: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
    ) -> Result<ExecutionResult, HostError> {
        let descriptor = self
            .registry
            .get(snippet_id)
            .await
            .ok_or_else(|| GraphError::UnknownSnippet(snippet_id.to_string()))?;
        let execution_id = ExecutionId::new_v4();
        Ok(self
            .engine
            .execute(execution_id, node, &descriptor, inputs, parameters)
            .await)
    }

    /// Execute a whole graph pass.
    pub async fn run_graph(
        &self,
        graph: &GraphSpec,
        external_inputs: HashMap<NodeId, HashMap<String, Value>>,
    ) -> Result<GraphReport, HostError> {
        self.runner
            .run(
                graph,
                &self.registry,
                self.engine.clone(),
                &self.events,
                external_inputs,
            )
            .await
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.events.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.events
    }
}

impl Default for SnippetHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub max_parallel_nodes: usize,
    pub event_buffer_size: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_parallel_nodes: 10,
            event_buffer_size: 1000,
        }
    }
}
