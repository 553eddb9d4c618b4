//! Output-to-input routing across graph edges.

use snipcore::{ExecutionResult, NodeId, Outcome, Value, WiringTable};
use std::collections::HashMap;

/// Stage a node's outputs onto the input ports of its downstream consumers.
///
/// Each matching edge receives its own deep copy (`Value` owns all of its
/// data, so `clone` is a deep copy): two consumers of the same upstream
/// output never observe each other's mutations. Outputs with no matching
/// edge are dropped; terminal or unused outputs are legal. A `Failed`
/// result routes nothing, so failed nodes never emit values.
pub fn route(
    result: &ExecutionResult,
    wiring: &WiringTable,
) -> HashMap<(NodeId, String), Value> {
    let mut staged = HashMap::new();
    let outputs = match &result.outcome {
        Outcome::Succeeded { outputs } => outputs,
        Outcome::Failed { .. } => return staged,
    };

    for (name, value) in outputs {
        for edge in wiring.edges_from(result.node, name) {
            staged.insert((edge.to_node, edge.to_port.clone()), value.clone());
        }
    }
    staged
}
