//! Nearest-first placement. A node bids itself when it can, otherwise the request goes to its
//! reachable neighbors in order of increasing latency.

use crate::core::common::NodeId;
use crate::core::sla::{Bid, Sla};
use crate::core::topology::Topology;
use crate::placement::interface::{reachable_neighbors, PlacementStrategy, Visit};

fn arrive_nearest_first(
    topology: &Topology,
    node: NodeId,
    caller: Option<NodeId>,
    sla: &Sla,
    accumulated_latency: f64,
) -> Visit {
    if let Some(bid) = topology.node(node).bid(sla, accumulated_latency) {
        return Visit::answer(vec![bid]);
    }
    let mut neighbors = reachable_neighbors(topology, node, caller, sla, accumulated_latency);
    // stable, so equal latencies keep children before the parent
    neighbors.sort_by(|a, b| a.1.total_cmp(&b.1));
    Visit::forward(neighbors)
}

/// Takes the bids of the first branch which has any.
pub struct EdgeFirstPlacement {}

impl PlacementStrategy for EdgeFirstPlacement {
    fn name(&self) -> &str {
        "edge_first"
    }

    fn arrive(
        &self,
        topology: &Topology,
        node: NodeId,
        caller: Option<NodeId>,
        sla: &Sla,
        accumulated_latency: f64,
    ) -> Visit {
        arrive_nearest_first(topology, node, caller, sla, accumulated_latency)
    }

    fn continue_after(&self, collected: &[Bid], _next_arrival: f64) -> bool {
        collected.is_empty()
    }
}

/// Returns the nearest bid over all branches. Exploration stops as soon as the best bid found is
/// not farther than the entry latency of the next branch, since nothing in that branch can be
/// closer.
pub struct EdgeFirstV2Placement {}

impl PlacementStrategy for EdgeFirstV2Placement {
    fn name(&self) -> &str {
        "edge_first_v2"
    }

    fn arrive(
        &self,
        topology: &Topology,
        node: NodeId,
        caller: Option<NodeId>,
        sla: &Sla,
        accumulated_latency: f64,
    ) -> Visit {
        arrive_nearest_first(topology, node, caller, sla, accumulated_latency)
    }

    fn continue_after(&self, collected: &[Bid], next_arrival: f64) -> bool {
        collected
            .iter()
            .all(|found| found.accumulated_latency > next_arrival)
    }

    /// Keeps only the closest bid.
    fn merge(&self, collected: &mut Vec<Bid>, answer: Vec<Bid>) {
        for bid in answer {
            let closer = collected
                .iter()
                .all(|found| bid.accumulated_latency < found.accumulated_latency);
            if closer {
                *collected = vec![bid];
            }
        }
    }
}
