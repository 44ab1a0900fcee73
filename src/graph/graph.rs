use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of a node inside the [`Graph`] that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Directed, weighted connection between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub cost: f64,
}

#[derive(Clone, Debug)]
pub struct Node<R> {
    pub record: R,
    /// Outgoing edges; `edge.from` is always this node.
    pub edges: Vec<Edge>,
}

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node {0} does not belong to this graph")]
    UnknownNode(NodeId),
    #[error("edge {from} -> {to} has invalid cost {cost}")]
    NegativeCost { from: NodeId, to: NodeId, cost: f64 },
}

/// Adjacency-list graph whose nodes carry an arbitrary record.
///
/// Nodes and edges are only ever added. An undirected connection is two
/// directed edges of equal cost.
#[derive(Clone, Debug)]
pub struct Graph<R> {
    nodes: Vec<Node<R>>,
    edge_count: usize,
}

impl<R> Default for Graph<R> {
    fn default() -> Self {
        Graph {
            nodes: Vec::new(),
            edge_count: 0,
        }
    }
}

impl<R> Graph<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn add_node(&mut self, record: R) -> NodeId {
        self.nodes.push(Node {
            record,
            edges: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<R>, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode(id))
    }

    pub fn record(&self, id: NodeId) -> Result<&R, GraphError> {
        self.node(id).map(|n| &n.record)
    }

    pub fn edges(&self, id: NodeId) -> Result<&[Edge], GraphError> {
        self.node(id).map(|n| n.edges.as_slice())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<R>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Adds a directed edge. Costs are not validated here; the search
    /// rejects negative costs when it meets them.
    pub fn connect(&mut self, from: NodeId, to: NodeId, cost: f64) -> Result<(), GraphError> {
        if to.0 >= self.nodes.len() {
            return Err(GraphError::UnknownNode(to));
        }
        let node = self
            .nodes
            .get_mut(from.0)
            .ok_or(GraphError::UnknownNode(from))?;
        node.edges.push(Edge { from, to, cost });
        self.edge_count += 1;
        Ok(())
    }

    pub fn connect_bidirectional(
        &mut self,
        a: NodeId,
        b: NodeId,
        cost: f64,
    ) -> Result<(), GraphError> {
        self.connect(a, b, cost)?;
        self.connect(b, a, cost)
    }
}

impl<R: fmt::Display> fmt::Display for Graph<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{}:", node.record)?;
            for edge in &node.edges {
                writeln!(f, "    {} @ {:.3}", self.nodes[edge.to.0].record, edge.cost)?;
            }
        }
        Ok(())
    }
}
