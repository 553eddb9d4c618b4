use crate::{GraphError, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub type GraphId = Uuid;
pub type NodeId = Uuid;

/// One directed edge of the wiring table: a named output of an upstream
/// node feeding a named input of a downstream node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEdge {
    pub from_node: NodeId,
    pub from_port: String,
    pub to_node: NodeId,
    pub to_port: String,
}

/// The graph's wiring table.
///
/// Invariant: each `(to_node, to_port)` pair appears at most once; an input
/// receives at most one upstream source. Parameters are supplied
/// independently, never via edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WiringTable {
    edges: Vec<WireEdge>,
}

impl WiringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: impl Into<String>,
        to_node: NodeId,
        to_port: impl Into<String>,
    ) -> Result<(), GraphError> {
        let to_port = to_port.into();
        if self
            .edges
            .iter()
            .any(|e| e.to_node == to_node && e.to_port == to_port)
        {
            return Err(GraphError::DuplicateInputWire {
                node: to_node,
                port: to_port,
            });
        }
        self.edges.push(WireEdge {
            from_node,
            from_port: from_port.into(),
            to_node,
            to_port,
        });
        Ok(())
    }

    pub fn edges(&self) -> &[WireEdge] {
        &self.edges
    }

    /// Edges carrying a specific output of a specific node.
    pub fn edges_from<'a>(
        &'a self,
        node: NodeId,
        port: &'a str,
    ) -> impl Iterator<Item = &'a WireEdge> {
        self.edges
            .iter()
            .filter(move |e| e.from_node == node && e.from_port == port)
    }

    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &WireEdge> {
        self.edges.iter().filter(move |e| e.to_node == node)
    }

    pub fn has_incoming(&self, node: NodeId) -> bool {
        self.incoming(node).next().is_some()
    }
}

/// A node of the graph: which snippet it runs and its parameter values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeBinding {
    pub id: NodeId,
    pub snippet_id: String,
    pub parameters: HashMap<String, Value>,
}

impl NodeBinding {
    pub fn new(snippet_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            snippet_id: snippet_id.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// Complete graph definition: node bindings plus the wiring table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSpec {
    pub id: GraphId,
    pub name: String,
    pub nodes: Vec<NodeBinding>,
    pub wiring: WiringTable,
}

impl GraphSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            nodes: Vec::new(),
            wiring: WiringTable::new(),
        }
    }

    pub fn add_node(&mut self, node: NodeBinding) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: impl Into<String>,
        to_node: NodeId,
        to_port: impl Into<String>,
    ) -> Result<(), GraphError> {
        self.wiring.connect(from_node, from_port, to_node, to_port)
    }

    pub fn find_node(&self, id: NodeId) -> Option<&NodeBinding> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
