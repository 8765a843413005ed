//! Parallel evaluation of independent routes over a shared network.

use ev_network::RoadNetwork;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::RouteError;
use crate::assemble::simulate_node_route;
use crate::traversal::{RouteParameters, RouteSummary};

/// One route to evaluate, as produced by the graph search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub id: String,
    pub nodes: Vec<u64>,
}

/// Outcome of one batch entry; failures stay attached to their request.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub result: Result<RouteSummary, RouteError>,
}

/// Simulate every request in parallel; each traversal owns its own state.
///
/// Output order matches `requests`.
pub fn simulate_batch(
    params: &RouteParameters,
    network: &RoadNetwork,
    requests: &[RouteRequest],
) -> Result<Vec<BatchOutcome>, RouteError> {
    params.validate()?;
    let outcomes: Vec<BatchOutcome> = requests
        .par_iter()
        .map(|request| BatchOutcome {
            id: request.id.clone(),
            result: simulate_node_route(params, network, &request.nodes)
                .map(|report| report.summary),
        })
        .collect();
    info!(
        routes = outcomes.len(),
        failed = outcomes.iter().filter(|o| o.result.is_err()).count(),
        "batch evaluated"
    );
    Ok(outcomes)
}
