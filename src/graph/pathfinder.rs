use std::rc::Rc;

use log::trace;
use serde::Serialize;

use crate::graph::graph::{Edge, Graph, GraphError, NodeId};
use crate::queue::priority_queue::PriorityQueue;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathStep {
    pub node: NodeId,
    /// Cumulative cost on arrival at `node`.
    pub cost: f64,
}

/// Result of a successful [`traverse`].
#[derive(Clone, Debug, PartialEq)]
pub struct Traversal {
    pub cost: f64,
    /// Every node on the route, starting with the origin.
    pub path: Vec<PathStep>,
}

impl Traversal {
    pub fn nodes(&self) -> Vec<NodeId> {
        self.path.iter().map(|step| step.node).collect()
    }
}

/// One candidate move handed to the transition function.
#[derive(Clone, Copy, Debug)]
pub struct Step<'a, R> {
    pub edge: &'a Edge,
    pub from: &'a R,
    pub to: &'a R,
}

/// Nodes visited on one path, newest first. Branches share their prefix.
struct Trail {
    step: PathStep,
    prev: Option<Rc<Trail>>,
}

impl Trail {
    fn has_visited(&self, node: NodeId) -> bool {
        let mut cursor = Some(self);
        while let Some(t) = cursor {
            if t.step.node == node {
                return true;
            }
            cursor = t.prev.as_deref();
        }
        false
    }

    fn to_path(&self) -> Vec<PathStep> {
        let mut path = Vec::new();
        let mut cursor = Some(self);
        while let Some(t) = cursor {
            path.push(t.step);
            cursor = t.prev.as_deref();
        }
        path.reverse();
        path
    }
}

struct Frontier<S> {
    cost: f64,
    trail: Rc<Trail>,
    state: S,
}

/// Uniform-cost search from `from` to `to` with caller-controlled edges.
///
/// Each frontier entry carries a private state `S`. For every outgoing edge
/// whose destination is not already on the entry's own path, `transition`
/// receives the current state and the step; `None` rejects the edge, `Some`
/// gives the successor state. The first time a node is popped it is settled
/// and later entries for it are dropped.
///
/// Returns `Ok(None)` when the frontier runs out before reaching `to`.
/// A negative or NaN edge cost is an error, since settling depends on
/// non-negative costs.
pub fn traverse<R, S, F>(
    graph: &Graph<R>,
    initial: S,
    from: NodeId,
    to: NodeId,
    mut transition: F,
) -> Result<Option<Traversal>, GraphError>
where
    F: FnMut(&S, Step<'_, R>) -> Option<S>,
{
    graph.node(from)?;
    graph.node(to)?;

    let mut settled = vec![false; graph.len()];
    let mut open = PriorityQueue::new(|a: &Frontier<S>, b: &Frontier<S>| a.cost < b.cost);
    open.push(Frontier {
        cost: 0.0,
        trail: Rc::new(Trail {
            step: PathStep {
                node: from,
                cost: 0.0,
            },
            prev: None,
        }),
        state: initial,
    });

    while let Some(current) = open.pop() {
        let current_node = current.trail.step.node;
        if settled[current_node.0] {
            continue;
        }
        settled[current_node.0] = true;

        if current_node == to {
            return Ok(Some(Traversal {
                cost: current.cost,
                path: current.trail.to_path(),
            }));
        }

        let node = graph.node(current_node)?;
        for edge in &node.edges {
            if edge.cost.is_nan() || edge.cost < 0.0 {
                return Err(GraphError::NegativeCost {
                    from: edge.from,
                    to: edge.to,
                    cost: edge.cost,
                });
            }
            if current.trail.has_visited(edge.to) {
                trace!("{} -> {}: already on this path", edge.from, edge.to);
                continue;
            }
            let step = Step {
                edge,
                from: &node.record,
                to: graph.record(edge.to)?,
            };
            let Some(next_state) = transition(&current.state, step) else {
                trace!("{} -> {}: rejected by state", edge.from, edge.to);
                continue;
            };
            let cost = current.cost + edge.cost;
            trace!("{} -> {}: queued at {:.3}", edge.from, edge.to, cost);
            open.push(Frontier {
                cost,
                trail: Rc::new(Trail {
                    step: PathStep {
                        node: edge.to,
                        cost,
                    },
                    prev: Some(Rc::clone(&current.trail)),
                }),
                state: next_state,
            });
        }
    }

    Ok(None)
}
