//! Turn an ordered node list from the graph search into the path records to simulate.

use ev_network::{RoadNetwork, RoadPath};
use tracing::warn;

use crate::RouteError;
use crate::traversal::{RouteParameters, RouteReport, simulate_route};

/// Paths found for consecutive node pairs, plus the pairs that had none.
#[derive(Debug, Clone, Default)]
pub struct AssembledRoute<'a> {
    pub paths: Vec<&'a RoadPath>,
    pub missing: Vec<(u64, u64)>,
}

impl AssembledRoute<'_> {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Map each consecutive node pair to the first path joining it; gaps are collected, not fatal.
pub fn assemble_route<'a>(network: &'a RoadNetwork, nodes: &[u64]) -> AssembledRoute<'a> {
    let mut route = AssembledRoute::default();
    for pair in nodes.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        match network.find_path(from, to) {
            Some(path) => route.paths.push(path),
            None => {
                warn!(from, to, "no segment data between nodes");
                route.missing.push((from, to));
            }
        }
    }
    route
}

/// Assemble and simulate a node route, recording missing pairs in the summary.
pub fn simulate_node_route(
    params: &RouteParameters,
    network: &RoadNetwork,
    nodes: &[u64],
) -> Result<RouteReport, RouteError> {
    let assembled = assemble_route(network, nodes);
    let mut report = simulate_route(params, &assembled.paths)?;
    report.summary.set_missing(assembled.missing);
    Ok(report)
}
