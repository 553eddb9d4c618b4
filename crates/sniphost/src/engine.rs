use crate::gate::DependencyGate;
use crate::marshal;
use chrono::Utc;
use futures::FutureExt;
use snipcore::{
    ErrorRecord, EventBus, ExecutionEvent, ExecutionId, ExecutionResult, NodeId, ResultBuilder,
    RunError, SnippetDescriptor, Value,
};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Runs one node at a time under a failure boundary.
///
/// Stateless per call and safe to invoke concurrently for distinct nodes;
/// the dependency gate behind it is the only shared mutable state. Every
/// per-node error becomes a `Failed` outcome; nothing escapes to the
/// caller, which is why `execute` is infallible.
pub struct ExecutionEngine {
    gate: Arc<DependencyGate>,
    events: Arc<EventBus>,
}

impl ExecutionEngine {
    pub fn new(gate: Arc<DependencyGate>, events: Arc<EventBus>) -> Self {
        Self { gate, events }
    }

    pub async fn execute(
        &self,
        execution_id: ExecutionId,
        node: NodeId,
        descriptor: &SnippetDescriptor,
        inputs: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
    ) -> ExecutionResult {
        self.execute_with_cancellation(
            execution_id,
            node,
            descriptor,
            inputs,
            parameters,
            CancellationToken::new(),
        )
        .await
    }

    /// One atomic attempt: Pending -> Running -> Succeeded | Failed.
    ///
    /// Cancellation via the token turns the node `Failed` with a
    /// cancellation record; the node is never left running from the
    /// caller's point of view. The engine never retries; a caller wanting
    /// retries re-invokes with the same inputs.
    pub async fn execute_with_cancellation(
        &self,
        execution_id: ExecutionId,
        node: NodeId,
        descriptor: &SnippetDescriptor,
        inputs: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
        cancellation: CancellationToken,
    ) -> ExecutionResult {
        let start = Instant::now();
        let mut builder = ResultBuilder::new(node);

        self.events.emit(ExecutionEvent::NodeStarted {
            execution_id,
            node_id: node,
            snippet_id: descriptor.id.clone(),
            timestamp: Utc::now(),
        });
        builder.log(format!("running snippet '{}'", descriptor.id));

        match self
            .try_run(node, descriptor, inputs, parameters, cancellation, &mut builder)
            .await
        {
            Ok(outputs) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                tracing::info!(node = %node, snippet = %descriptor.id, duration_ms, "node succeeded");
                self.events.emit(ExecutionEvent::NodeSucceeded {
                    execution_id,
                    node_id: node,
                    outputs: outputs.clone(),
                    duration_ms,
                    timestamp: Utc::now(),
                });
                builder.set_successful_result(outputs);
            }
            Err(e) => {
                tracing::warn!(node = %node, snippet = %descriptor.id, error = %e, "node failed");
                self.events.emit(ExecutionEvent::NodeFailed {
                    execution_id,
                    node_id: node,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                builder.log(e.to_string());
                builder.set_exception_result(ErrorRecord {
                    message: e.to_string(),
                    origin: node,
                });
            }
        }

        builder.finalize()
    }

    async fn try_run(
        &self,
        node: NodeId,
        descriptor: &SnippetDescriptor,
        mut inputs: HashMap<String, Value>,
        mut parameters: HashMap<String, Value>,
        cancellation: CancellationToken,
        builder: &mut ResultBuilder,
    ) -> Result<HashMap<String, Value>, RunError> {
        // (a) dependency gate
        self.gate.ensure(&descriptor.dependencies).await?;

        // (b) marshal declared inputs and parameters at the consuming port
        let mut resolved_inputs = HashMap::new();
        for schema in &descriptor.inputs {
            match inputs.remove(&schema.name) {
                Some(value) => {
                    resolved_inputs.insert(schema.name.clone(), marshal::coerce(value, schema)?);
                }
                None if schema.required => {
                    return Err(RunError::MissingInput(schema.name.clone()))
                }
                None => {}
            }
        }
        let mut resolved_parameters = HashMap::new();
        for schema in &descriptor.parameters {
            match parameters.remove(&schema.name) {
                Some(value) => {
                    resolved_parameters
                        .insert(schema.name.clone(), marshal::coerce(value, schema)?);
                }
                None if schema.required => {
                    return Err(RunError::MissingParameter(schema.name.clone()))
                }
                None => {}
            }
        }

        // (c) invoke the entry point under the failure boundary
        let entrypoint = descriptor.entrypoint();
        let run = AssertUnwindSafe(entrypoint.run(&resolved_inputs, &resolved_parameters))
            .catch_unwind();
        let outcome = tokio::select! {
            _ = cancellation.cancelled() => return Err(RunError::Cancelled),
            outcome = run => outcome,
        };
        let mut produced = match outcome {
            Ok(Ok(outputs)) => outputs,
            Ok(Err(e)) => return Err(e),
            Err(panic) => return Err(RunError::Panicked(panic_message(panic))),
        };

        // (d) every declared required output must be present
        let mut accepted = HashMap::new();
        for schema in &descriptor.outputs {
            match produced.remove(&schema.name) {
                Some(value) => {
                    accepted.insert(schema.name.clone(), value);
                }
                None if schema.required => {
                    return Err(RunError::MissingOutput(schema.name.clone()))
                }
                None => {}
            }
        }
        // undeclared names are dropped, not an error
        for name in produced.keys() {
            tracing::warn!(node = %node, snippet = %descriptor.id, output = %name, "dropping undeclared output");
            builder.log(format!("dropping undeclared output '{name}'"));
        }

        // (e) package accepted outputs
        Ok(accepted)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
