use crate::engine::ExecutionEngine;
use crate::registry::SnippetRegistry;
use crate::router;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use snipcore::{
    ErrorRecord, EventBus, ExecutionEvent, ExecutionId, ExecutionResult, GraphError, GraphSpec,
    HostError, NodeId, ResultBuilder, SnippetDescriptor, Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Executes a whole graph pass over the wiring table's partial order.
///
/// Nodes with no ancestor/descendant relationship run in parallel up to
/// `max_parallel`. A failed node marks its transitive descendants skipped;
/// sibling branches keep running. Per-node failures never abort the pass,
/// only malformed graphs do.
pub struct GraphRunner {
    max_parallel: usize,
}

/// Outcome of one graph pass, serializable for the reporting sink.
#[derive(Debug, serde::Serialize)]
pub struct GraphReport {
    pub execution_id: ExecutionId,
    pub results: HashMap<NodeId, ExecutionResult>,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl GraphRunner {
    pub fn new(max_parallel: usize) -> Self {
        Self { max_parallel }
    }

    pub async fn run(
        &self,
        graph: &GraphSpec,
        registry: &SnippetRegistry,
        engine: Arc<ExecutionEngine>,
        events: &EventBus,
        external_inputs: HashMap<NodeId, HashMap<String, Value>>,
    ) -> Result<GraphReport, HostError> {
        let execution_id = ExecutionId::new_v4();
        let start = Instant::now();

        events.emit(ExecutionEvent::GraphStarted {
            execution_id,
            graph_id: graph.id,
            timestamp: Utc::now(),
        });
        tracing::info!(graph = %graph.name, execution = %execution_id, "starting graph execution");

        // Descriptor snapshot for the whole pass: a reload happening
        // concurrently must not switch a node to a new version mid-run.
        let mut descriptors: HashMap<NodeId, Arc<SnippetDescriptor>> = HashMap::new();
        for binding in &graph.nodes {
            let descriptor = registry
                .get(&binding.snippet_id)
                .await
                .ok_or_else(|| GraphError::UnknownSnippet(binding.snippet_id.clone()))?;
            descriptors.insert(binding.id, descriptor);
        }

        let (dag, node_to_index) = build_dag(graph)?;

        let mut staged: HashMap<(NodeId, String), Value> = HashMap::new();
        let mut results: HashMap<NodeId, ExecutionResult> = HashMap::new();
        let mut succeeded: HashSet<NodeId> = HashSet::new();
        let mut launched: HashSet<NodeId> = HashSet::new();
        let mut dead: HashSet<NodeId> = HashSet::new();
        let mut failed = 0usize;
        let mut skipped = 0usize;
        let mut running = FuturesUnordered::new();

        loop {
            for node_id in find_ready(&dag, &node_to_index, &succeeded, &launched, &dead) {
                if running.len() >= self.max_parallel {
                    break;
                }
                let binding = graph
                    .find_node(node_id)
                    .ok_or(GraphError::NodeNotFound(node_id))?;
                let descriptor = descriptors[&node_id].clone();

                // external values first, then staged upstream values
                let mut inputs: HashMap<String, Value> = external_inputs
                    .get(&node_id)
                    .cloned()
                    .unwrap_or_default();
                for edge in graph.wiring.incoming(node_id) {
                    if let Some(value) = staged.remove(&(node_id, edge.to_port.clone())) {
                        inputs.insert(edge.to_port.clone(), value);
                    }
                }

                let parameters = binding.parameters.clone();
                let engine = engine.clone();
                launched.insert(node_id);
                running.push(tokio::spawn(async move {
                    let result = engine
                        .execute(execution_id, node_id, &descriptor, inputs, parameters)
                        .await;
                    (node_id, result)
                }));
            }

            if running.is_empty() {
                break;
            }

            if let Some(joined) = running.next().await {
                let (node_id, result) = joined
                    .map_err(|e| GraphError::Internal(format!("task join error: {e}")))?;

                if result.succeeded() {
                    staged.extend(router::route(&result, &graph.wiring));
                    succeeded.insert(node_id);
                } else {
                    failed += 1;
                    dead.insert(node_id);
                    skipped += mark_descendants_skipped(
                        node_id,
                        &dag,
                        &node_to_index,
                        &launched,
                        &mut dead,
                        &mut results,
                    );
                }
                results.insert(node_id, result);
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let success = failed == 0 && skipped == 0;
        events.emit(ExecutionEvent::GraphCompleted {
            execution_id,
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!(
            graph = %graph.name,
            execution = %execution_id,
            duration_ms,
            completed = succeeded.len(),
            failed,
            skipped,
            "graph execution finished"
        );

        Ok(GraphReport {
            execution_id,
            completed: succeeded.len(),
            failed,
            skipped,
            results,
        })
    }
}

fn build_dag(
    graph: &GraphSpec,
) -> Result<(DiGraph<NodeId, ()>, HashMap<NodeId, NodeIndex>), GraphError> {
    let mut dag = DiGraph::new();
    let mut node_to_index = HashMap::new();

    for binding in &graph.nodes {
        let idx = dag.add_node(binding.id);
        node_to_index.insert(binding.id, idx);
    }

    for edge in graph.wiring.edges() {
        let from = node_to_index
            .get(&edge.from_node)
            .ok_or(GraphError::NodeNotFound(edge.from_node))?;
        let to = node_to_index
            .get(&edge.to_node)
            .ok_or(GraphError::NodeNotFound(edge.to_node))?;
        dag.add_edge(*from, *to, ());
    }

    if toposort(&dag, None).is_err() {
        return Err(GraphError::CyclicDependency);
    }

    Ok((dag, node_to_index))
}

/// Nodes whose ancestors have all succeeded and which have not been
/// launched or written off yet.
fn find_ready(
    dag: &DiGraph<NodeId, ()>,
    node_to_index: &HashMap<NodeId, NodeIndex>,
    succeeded: &HashSet<NodeId>,
    launched: &HashSet<NodeId>,
    dead: &HashSet<NodeId>,
) -> Vec<NodeId> {
    let mut ready = Vec::new();
    for (node_id, idx) in node_to_index {
        if launched.contains(node_id) || dead.contains(node_id) {
            continue;
        }
        let deps_met = dag
            .neighbors_directed(*idx, petgraph::Direction::Incoming)
            .all(|dep_idx| {
                let dep = dag.node_weight(dep_idx).expect("dag node has weight");
                succeeded.contains(dep)
            });
        if deps_met {
            ready.push(*node_id);
        }
    }
    ready
}

/// Write off everything downstream of a failed node. The skip record's
/// origin points at the failed upstream node.
fn mark_descendants_skipped(
    failed_node: NodeId,
    dag: &DiGraph<NodeId, ()>,
    node_to_index: &HashMap<NodeId, NodeIndex>,
    launched: &HashSet<NodeId>,
    dead: &mut HashSet<NodeId>,
    results: &mut HashMap<NodeId, ExecutionResult>,
) -> usize {
    let mut skipped = 0;
    let mut stack = vec![node_to_index[&failed_node]];
    let mut seen = HashSet::new();

    while let Some(idx) = stack.pop() {
        for next in dag.neighbors_directed(idx, petgraph::Direction::Outgoing) {
            if !seen.insert(next) {
                continue;
            }
            stack.push(next);
            let descendant = *dag.node_weight(next).expect("dag node has weight");
            if launched.contains(&descendant) || !dead.insert(descendant) {
                continue;
            }
            skipped += 1;
            tracing::warn!(node = %descendant, upstream = %failed_node, "skipping node, upstream failure");
            let mut builder = ResultBuilder::new(descendant);
            builder.log("skipped: upstream node failed");
            builder.set_exception_result(ErrorRecord {
                message: "skipped: upstream node failed".to_string(),
                origin: failed_node,
            });
            results.insert(descendant, builder.finalize());
        }
    }
    skipped
}
