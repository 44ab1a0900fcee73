use thiserror::Error;

use crate::graph::graph::{GraphError, NodeId};

/// Errors raised while building or querying a route graph.
///
/// Every variant is fatal for the run. An infeasible route is not an error;
/// it is reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Only one of the two circle/circle root searches converged, which
    /// means the intersection geometry is inconsistent.
    #[error("found only one service-circle intersection between {first} and {second}")]
    InconsistentIntersection { first: String, second: String },

    #[error("node {0} is not an airport")]
    NotAnAirport(NodeId),
}
